//! Integration tests for the charge tracker.
//!
//! These tests drive a tracker through multi-day scenarios with a manual
//! clock and check what ends up in the store.

use chargeminder_core::storage::{Database, HISTORY_LIMIT};
use chargeminder_core::{
    ChargeTracker, Config, Event, FixedRates, MarkOutcome, MemoryStore, RecordingNotifier,
    SeededRates,
};
use chargeminder_core::{Clock, ManualClock};
use chrono::{DateTime, Duration, Local, TimeZone};

fn at(day: u32, hour: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 6, day, hour, 0, 0).unwrap()
}

fn tracker(clock: &ManualClock) -> ChargeTracker<MemoryStore> {
    ChargeTracker::new(
        MemoryStore::new(),
        Config::default(),
        Box::new(clock.clone()),
        Box::new(RecordingNotifier::granting()),
    )
    .with_message_seed(11)
}

#[test]
fn test_default_settings() {
    let clock = ManualClock::new(at(3, 9));
    let tracker = tracker(&clock);
    let settings = tracker.settings();
    assert!(settings.notifications);
    assert_eq!(settings.reminder_interval_minutes, 360);
    assert!(settings.last_charged.is_none());
}

#[test]
fn test_add_charge_record_with_level() {
    let clock = ManualClock::new(at(3, 21));
    let mut tracker = tracker(&clock);
    tracker.add_charge_record(Some(85)).unwrap();

    let history = tracker.history();
    assert_eq!(history[0].battery_level, Some(85));
    assert_eq!(history[0].date, clock.today().format("%Y-%m-%d").to_string());
    assert_eq!(history[0].time, "21:00");
}

#[test]
fn test_set_battery_level_then_read_with_random_drain() {
    let clock = ManualClock::new(at(3, 12));
    let mut tracker = tracker(&clock).with_rates(Box::new(SeededRates::new(Some(99))));
    tracker.set_battery_level(50).unwrap();

    for _ in 0..20 {
        let level = tracker.battery_level().unwrap();
        assert!((48..=50).contains(&level), "level {level}");
    }
    clock.advance(Duration::minutes(15));
    for _ in 0..20 {
        let level = tracker.battery_level().unwrap();
        assert!((48..=50).contains(&level), "level {level}");
    }
}

#[test]
fn test_history_keeps_newest_hundred() {
    let clock = ManualClock::new(at(1, 8));
    let mut tracker = tracker(&clock);
    let mut first = None;
    let mut last = None;
    for n in 0..=HISTORY_LIMIT {
        let record = tracker.add_charge_record(Some((n % 100) as u8)).unwrap();
        if n == 0 {
            first = Some(record.id.clone());
        }
        last = Some(record.id);
        clock.advance(Duration::minutes(1));
    }

    let history = tracker.history();
    assert_eq!(history.len(), HISTORY_LIMIT);
    assert_eq!(Some(history[0].id.clone()), last);
    assert!(history.iter().all(|r| Some(&r.id) != first.as_ref()));
}

#[test]
fn test_streak_over_several_days() {
    let clock = ManualClock::new(at(1, 21));
    let mut tracker = tracker(&clock);

    tracker.mark_charged().unwrap();
    clock.set(at(2, 21));
    tracker.mark_charged().unwrap();
    clock.set(at(3, 20));
    tracker.mark_charged().unwrap();
    assert_eq!(tracker.streak().streak, 3);

    // Same day again: logged, streak unchanged.
    let event = tracker.mark_charged().unwrap();
    assert!(matches!(
        event,
        Event::ChargeMarked {
            outcome: MarkOutcome::AlreadyMarked { streak: 3 },
            ..
        }
    ));
    assert_eq!(tracker.streak().streak, 3);
    assert_eq!(tracker.history().len(), 4);
}

#[test]
fn test_skipped_day_resets_on_activation() {
    let clock = ManualClock::new(at(1, 21));
    let mut tracker = tracker(&clock);
    tracker.mark_charged().unwrap();
    clock.set(at(2, 21));
    tracker.mark_charged().unwrap();

    clock.set(at(4, 9));
    let reset = tracker.activate().unwrap();
    assert!(matches!(reset, Some(Event::StreakReset { previous: 2, .. })));
    assert_eq!(tracker.streak().streak, 0);
    assert_eq!(tracker.activate().unwrap(), None);

    tracker.mark_charged().unwrap();
    assert_eq!(tracker.streak().streak, 1);
}

#[test]
fn test_skipped_day_resets_even_without_activation() {
    let clock = ManualClock::new(at(1, 21));
    let mut tracker = tracker(&clock);
    tracker.mark_charged().unwrap();
    clock.set(at(2, 21));
    tracker.mark_charged().unwrap();

    clock.set(at(5, 21));
    tracker.mark_charged().unwrap();
    assert_eq!(tracker.streak().streak, 1);
}

#[test]
fn test_forgotten_resets_streak() {
    let clock = ManualClock::new(at(1, 21));
    let mut tracker = tracker(&clock);
    tracker.mark_charged().unwrap();
    let event = tracker.mark_forgotten().unwrap();
    assert!(matches!(event, Event::MarkedForgotten { .. }));
    assert_eq!(tracker.streak().streak, 0);
}

#[test]
fn test_status_snapshot() {
    let clock = ManualClock::new(at(6, 21));
    let mut tracker = tracker(&clock).with_rates(Box::new(FixedRates {
        drain_per_hour: 4.0,
        charge_amount: 15,
    }));
    tracker.set_battery_level(30).unwrap();
    tracker.mark_charged().unwrap();

    let Event::StatusSnapshot {
        streak,
        charged_today,
        battery_level,
        last_charge,
        stats,
        ..
    } = tracker.status().unwrap()
    else {
        panic!("expected a status snapshot");
    };
    assert_eq!(streak, 1);
    assert!(charged_today);
    assert_eq!(battery_level, 45);
    assert_eq!(last_charge.and_then(|r| r.battery_level), Some(30));
    assert_eq!(stats.total_charges, 1);
    assert_eq!(stats.current_run, 1);
}

#[test]
fn test_clear_history() {
    let clock = ManualClock::new(at(6, 21));
    let mut tracker = tracker(&clock);
    tracker.mark_charged().unwrap();
    tracker.clear_history().unwrap();
    assert!(tracker.history().is_empty());
    // Streak is separate from the history list.
    assert_eq!(tracker.streak().streak, 1);
}

#[test]
fn test_state_persists_across_sessions_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chargeminder.db");
    let clock = ManualClock::new(at(7, 22));

    {
        let mut tracker = ChargeTracker::new(
            Database::open_at(&path).unwrap(),
            Config::default(),
            Box::new(clock.clone()),
            Box::new(RecordingNotifier::granting()),
        );
        tracker.set_battery_level(64).unwrap();
        tracker.mark_charged().unwrap();
        tracker.request_permission().unwrap();
    }

    let tracker = ChargeTracker::new(
        Database::open_at(&path).unwrap(),
        Config::default(),
        Box::new(clock.clone()),
        Box::new(RecordingNotifier::denying()),
    );
    assert_eq!(tracker.history().len(), 1);
    assert_eq!(tracker.streak().streak, 1);
    assert!(tracker.permission().is_granted());
    assert!(tracker.settings().last_charged.is_some());
}
