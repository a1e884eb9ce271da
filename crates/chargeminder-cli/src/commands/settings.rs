use chargeminder_core::SettingsPatch;
use clap::Subcommand;

use crate::context::{open_tracker, print_event, CliResult};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print the settings as JSON
    List,
    /// Set a setting (e.g. "notifications false", "reminderIntervalMinutes 120")
    Set {
        /// Setting key
        key: String,
        /// New value
        value: String,
    },
    /// Restore default settings
    Reset,
}

pub fn run(action: SettingsAction) -> CliResult {
    let mut tracker = open_tracker()?;
    match action {
        SettingsAction::List => {
            println!("{}", serde_json::to_string_pretty(&tracker.settings())?);
        }
        SettingsAction::Set { key, value } => {
            let patch = SettingsPatch::from_key_value(&key, &value)?;
            print_event(&tracker.update_settings(&patch)?)?;
        }
        SettingsAction::Reset => {
            print_event(&tracker.reset_settings()?)?;
        }
    }
    Ok(())
}
