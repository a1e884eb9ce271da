use clap::Subcommand;

use crate::context::{open_tracker, print_event, CliResult};

#[derive(Subcommand)]
pub enum BatteryAction {
    /// Print the simulated battery percentage
    Get,
    /// Anchor a known battery percentage (0-100)
    Set {
        level: u32,
    },
}

pub fn run(action: BatteryAction) -> CliResult {
    let mut tracker = open_tracker()?;
    match action {
        BatteryAction::Get => {
            println!("{}", tracker.battery_level()?);
        }
        BatteryAction::Set { level } => {
            print_event(&tracker.set_battery_level(level)?)?;
        }
    }
    Ok(())
}
