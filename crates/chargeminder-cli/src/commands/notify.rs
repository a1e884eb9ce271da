use clap::Subcommand;
use serde_json::json;

use crate::context::{open_tracker, print_event, CliResult};

#[derive(Subcommand)]
pub enum NotifyAction {
    /// Print the permission state
    Status,
    /// Ask for permission to show reminders (prompts only once)
    Request,
    /// Forget the permission decision
    Reset,
    /// Run one reminder check now
    Test,
}

pub fn run(action: NotifyAction) -> CliResult {
    let mut tracker = open_tracker()?;
    match action {
        NotifyAction::Status => {
            let status = json!({
                "permission": tracker.permission(),
                "notifications": tracker.settings().notifications,
                "last_notification": tracker.store().last_notification_time(),
            });
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        NotifyAction::Request => print_event(&tracker.request_permission()?)?,
        NotifyAction::Reset => print_event(&tracker.reset_permission()?)?,
        NotifyAction::Test => print_event(&tracker.maybe_show_reminder()?)?,
    }
    Ok(())
}
