use crate::context::{open_tracker, print_event, CliResult};

pub fn run_status() -> CliResult {
    let mut tracker = open_tracker()?;
    let snapshot = tracker.status()?;
    print_event(&snapshot)
}

pub fn run_charge(level: Option<u32>) -> CliResult {
    let mut tracker = open_tracker()?;
    if let Some(event) = tracker.activate()? {
        print_event(&event)?;
    }
    if let Some(level) = level {
        print_event(&tracker.set_battery_level(level)?)?;
    }
    print_event(&tracker.mark_charged()?)
}

pub fn run_forgot() -> CliResult {
    let mut tracker = open_tracker()?;
    print_event(&tracker.mark_forgotten()?)
}
