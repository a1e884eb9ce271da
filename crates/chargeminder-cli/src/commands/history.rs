use chargeminder_core::stats::group_by_date;
use chargeminder_core::{Clock, SystemClock};
use clap::Subcommand;

use crate::context::{open_tracker, print_event, CliResult};

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List charges, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Totals, weekly count and runs
    Stats,
    /// Delete the whole history
    Clear,
}

pub fn run(action: HistoryAction) -> CliResult {
    let mut tracker = open_tracker()?;
    match action {
        HistoryAction::List { json } => {
            let history = tracker.history();
            if json {
                println!("{}", serde_json::to_string_pretty(&history)?);
            } else if history.is_empty() {
                println!("No charges recorded yet.");
            } else {
                for group in group_by_date(&history, SystemClock.today()) {
                    println!("{} ({})", group.label, group.date);
                    for record in &group.records {
                        match record.battery_level {
                            Some(level) => println!("  {}  battery {level}%", record.time),
                            None => println!("  {}", record.time),
                        }
                    }
                }
            }
        }
        HistoryAction::Stats => {
            println!("{}", serde_json::to_string_pretty(&tracker.stats())?);
        }
        HistoryAction::Clear => {
            print_event(&tracker.clear_history()?)?;
        }
    }
    Ok(())
}
