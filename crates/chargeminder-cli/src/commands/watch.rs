//! Foreground reminder loop.
//!
//! Sleeps until the next due timer, ticks the tracker and prints events.
//! Lines on stdin answer the last reminder: `c` charged, `s` snooze,
//! `o` opened.

use std::time::Duration;

use chargeminder_core::notify::DAILY_TAG;
use chargeminder_core::{
    ChargeTracker, Clock, Database, Event, NotificationAction, NotificationResponse, SystemClock,
};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::context::{open_tracker, print_event, CliResult};

/// Upper bound on one sleep so clock changes are noticed.
const MAX_SLEEP: Duration = Duration::from_secs(60);

pub fn run() -> CliResult {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(watch())
}

async fn watch() -> CliResult {
    let mut tracker = open_tracker()?;
    if let Some(event) = tracker.activate()? {
        print_event(&event)?;
    }
    let interval = tracker.settings().reminder_interval_minutes;
    if let Some(event) = tracker.schedule_reminders(interval)? {
        print_event(&event)?;
    }
    if let Some(event) = tracker.schedule_daily_reminder(None)? {
        print_event(&event)?;
    }
    tracker.start_battery_poll();
    tracing::info!(pending = tracker.pending_timers(), "watching");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        let sleep_for = until_next_due(&tracker);
        tokio::select! {
            _ = tokio::time::sleep(sleep_for) => {
                for event in tracker.tick() {
                    print_event(&event)?;
                    if is_daily_reminder(&event) {
                        tracker.schedule_daily_reminder(None)?;
                    }
                }
            }
            line = lines.next_line(), if stdin_open => {
                match line? {
                    Some(line) => answer(&mut tracker, line.trim())?,
                    None => stdin_open = false,
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    tracker.shutdown();
    Ok(())
}

fn until_next_due(tracker: &ChargeTracker<Database>) -> Duration {
    match tracker.next_due() {
        Some(due) => {
            // Wake strictly after the due instant so a re-armed daily
            // reminder lands on the next day.
            let wait_ms = due.saturating_sub(SystemClock.now_ms()).max(0) as u64 + 1;
            Duration::from_millis(wait_ms).min(MAX_SLEEP)
        }
        None => MAX_SLEEP,
    }
}

fn is_daily_reminder(event: &Event) -> bool {
    matches!(event, Event::ReminderShown { tag, .. } if tag == DAILY_TAG)
}

fn answer(tracker: &mut ChargeTracker<Database>, input: &str) -> CliResult {
    let response = match input {
        "c" | "charged" => NotificationResponse::Action(NotificationAction::Charged),
        "s" | "snooze" => NotificationResponse::Action(NotificationAction::Snooze),
        "o" | "open" => NotificationResponse::Opened,
        "" => return Ok(()),
        other => {
            eprintln!("unknown answer '{other}' (c = charged, s = snooze, o = opened)");
            return Ok(());
        }
    };
    for event in tracker.handle_notification_response(response)? {
        print_event(&event)?;
    }
    Ok(())
}
