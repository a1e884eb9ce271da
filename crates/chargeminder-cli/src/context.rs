use chargeminder_core::{ChargeTracker, Config, Database, Event, SystemClock};

use crate::console::{ConsoleNotifier, SysfsBatteryProbe};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Tracker over the on-disk store and the user's config.
pub fn open_tracker() -> Result<ChargeTracker<Database>, Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let config = Config::load_or_default();
    let tracker = ChargeTracker::new(
        db,
        config,
        Box::new(SystemClock),
        Box::new(ConsoleNotifier::new()),
    )
    .with_probe(Box::new(SysfsBatteryProbe::default()));
    Ok(tracker)
}

pub fn print_event(event: &Event) -> CliResult {
    println!("{}", serde_json::to_string_pretty(event)?);
    Ok(())
}
