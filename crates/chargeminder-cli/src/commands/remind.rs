use chrono::NaiveTime;

use crate::context::{open_tracker, print_event, CliResult};

/// Schedule the daily reminder and report when it will fire.
///
/// The timer lives only as long as this process; `watch` keeps it running.
pub fn run(at: Option<String>) -> CliResult {
    let at = at
        .map(|raw| NaiveTime::parse_from_str(&raw, "%H:%M"))
        .transpose()
        .map_err(|e| format!("--at expects HH:MM: {e}"))?;
    let mut tracker = open_tracker()?;
    match tracker.schedule_daily_reminder(at)? {
        Some(event) => print_event(&event)?,
        None => println!("reminders are not permitted; run `chargeminder notify reset` to ask again"),
    }
    Ok(())
}
