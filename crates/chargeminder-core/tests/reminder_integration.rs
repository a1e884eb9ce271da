//! Integration tests for reminder scheduling.
//!
//! A manual clock stands in for wall time; each test advances it and calls
//! `tick()` the way the CLI watch loop does.

use chargeminder_core::notify::{DAILY_TAG, REMINDER_TAG};
use chargeminder_core::reminder::Suppression;
use chargeminder_core::{
    ChargeTracker, Clock, Config, Event, ManualClock, MemoryStore, NotificationAction,
    NotificationResponse, Permission, RecordingNotifier, SettingsPatch,
};
use chrono::{DateTime, Duration, Local, NaiveTime, TimeZone};

fn at(hour: u32, minute: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 9, 17, hour, minute, 0).unwrap()
}

fn setup(
    start: DateTime<Local>,
    notifier: RecordingNotifier,
) -> (ChargeTracker<MemoryStore>, ManualClock) {
    let clock = ManualClock::new(start);
    let tracker = ChargeTracker::new(
        MemoryStore::new(),
        Config::default(),
        Box::new(clock.clone()),
        Box::new(notifier),
    );
    (tracker, clock)
}

fn granted(start: DateTime<Local>) -> (ChargeTracker<MemoryStore>, ManualClock, RecordingNotifier) {
    let notifier = RecordingNotifier::granting();
    let (mut tracker, clock) = setup(start, notifier.clone());
    tracker.request_permission().unwrap();
    (tracker, clock, notifier)
}

fn shown_times(events: &[Event]) -> Vec<DateTime<Local>> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::ReminderShown { at, .. } => Some(*at),
            _ => None,
        })
        .collect()
}

#[test]
fn test_reminder_never_fires_twice_within_cooldown() {
    for (interval_min, tick_every_min) in [(1, 1), (5, 3), (10, 7), (29, 13), (45, 2)] {
        let (mut tracker, clock, _) = granted(at(6, 0));
        tracker.schedule_reminders(interval_min).unwrap();

        let mut events = Vec::new();
        for _ in 0..(12 * 60 / tick_every_min) {
            clock.advance(Duration::minutes(tick_every_min as i64));
            events.extend(tracker.tick());
        }

        let times = shown_times(&events);
        assert!(times.len() >= 2, "interval {interval_min}: {}", times.len());
        for pair in times.windows(2) {
            assert!(
                pair[1] - pair[0] >= Duration::minutes(30),
                "interval {interval_min}, tick {tick_every_min}: {} then {}",
                pair[0],
                pair[1]
            );
        }
    }
}

#[test]
fn test_cooldown_suppression_reports_remaining_time() {
    let (mut tracker, clock, notifier) = granted(at(10, 0));
    assert!(matches!(
        tracker.maybe_show_reminder().unwrap(),
        Event::ReminderShown { .. }
    ));
    clock.advance(Duration::minutes(10));
    let event = tracker.maybe_show_reminder().unwrap();
    assert!(matches!(
        event,
        Event::ReminderSuppressed {
            reason: Suppression::Cooldown { remaining_ms: 1_200_000 },
            ..
        }
    ));
    assert_eq!(notifier.shown().len(), 1);
    assert_eq!(notifier.shown()[0].tag, REMINDER_TAG);
    assert_eq!(
        notifier.shown()[0].actions,
        vec![NotificationAction::Charged, NotificationAction::Snooze]
    );
}

#[test]
fn test_reminder_check_does_not_prompt() {
    let notifier = RecordingNotifier::granting();
    let (mut tracker, _) = setup(at(10, 0), notifier.clone());
    let event = tracker.maybe_show_reminder().unwrap();
    assert!(matches!(
        event,
        Event::ReminderSuppressed {
            reason: Suppression::PermissionMissing,
            ..
        }
    ));
    assert_eq!(notifier.prompt_count(), 0);
}

#[test]
fn test_disabled_notifications_suppress_reminder() {
    let (mut tracker, _, notifier) = granted(at(10, 0));
    tracker
        .update_settings(&SettingsPatch::notifications(false))
        .unwrap();
    let event = tracker.maybe_show_reminder().unwrap();
    assert!(matches!(
        event,
        Event::ReminderSuppressed {
            reason: Suppression::Disabled,
            ..
        }
    ));
    assert!(notifier.shown().is_empty());
}

#[test]
fn test_daily_reminder_fires_once_at_target() {
    let (mut tracker, clock, notifier) = granted(at(19, 0));
    let scheduled = tracker.schedule_daily_reminder(None).unwrap();
    assert!(matches!(
        scheduled,
        Some(Event::DailyReminderScheduled { delay_ms: 3_600_000, .. })
    ));

    clock.set(at(19, 59));
    assert!(tracker.tick().is_empty());

    clock.set(at(20, 0));
    let events = tracker.tick();
    assert_eq!(events.len(), 1);
    assert_eq!(notifier.shown()[0].tag, DAILY_TAG);

    // One-shot: nothing left to fire tomorrow.
    assert_eq!(tracker.next_due(), None);
}

#[test]
fn test_daily_reminder_after_target_moves_to_tomorrow() {
    let (mut tracker, _, _) = granted(at(21, 0));
    let scheduled = tracker.schedule_daily_reminder(None).unwrap();
    let Some(Event::DailyReminderScheduled { delay_ms, due, .. }) = scheduled else {
        panic!("expected a scheduled reminder");
    };
    assert_eq!(delay_ms, 23 * 3_600_000);
    assert_eq!(due.time(), NaiveTime::from_hms_opt(20, 0, 0).unwrap());
}

#[test]
fn test_daily_reminder_custom_time() {
    let (mut tracker, _, _) = granted(at(7, 30));
    let scheduled = tracker
        .schedule_daily_reminder(NaiveTime::from_hms_opt(8, 0, 0))
        .unwrap();
    assert!(matches!(
        scheduled,
        Some(Event::DailyReminderScheduled { delay_ms: 1_800_000, .. })
    ));
}

#[test]
fn test_daily_reminder_prompts_once_then_respects_denial() {
    let notifier = RecordingNotifier::denying();
    let (mut tracker, _) = setup(at(12, 0), notifier.clone());

    assert_eq!(tracker.schedule_daily_reminder(None).unwrap(), None);
    assert_eq!(tracker.permission(), Permission::Denied);
    assert_eq!(tracker.schedule_daily_reminder(None).unwrap(), None);
    assert_eq!(notifier.prompt_count(), 1);
    assert_eq!(tracker.next_due(), None);
}

#[test]
fn test_unsupported_surface_gets_fallback_alert() {
    let (mut tracker, clock) = setup(at(12, 0), RecordingNotifier::unsupported());
    tracker.schedule_daily_reminder(None).unwrap();

    clock.advance(Duration::seconds(4));
    assert!(tracker.tick().is_empty());
    clock.advance(Duration::seconds(1));
    let events = tracker.tick();
    assert!(matches!(events.as_slice(), [Event::FallbackAlert { .. }]));
}

#[test]
fn test_snooze_reminds_again_later() {
    let (mut tracker, clock, notifier) = granted(at(9, 0));
    tracker.maybe_show_reminder().unwrap();

    let events = tracker
        .handle_notification_response(NotificationResponse::Action(NotificationAction::Snooze))
        .unwrap();
    assert!(matches!(events[1], Event::Snoozed { .. }));

    clock.advance(Duration::minutes(59));
    assert!(tracker.tick().is_empty());
    clock.advance(Duration::minutes(1));
    let events = tracker.tick();
    assert_eq!(shown_times(&events), vec![clock.now()]);
    assert_eq!(notifier.shown().len(), 2);
}

#[test]
fn test_charged_action_marks_the_day() {
    let (mut tracker, _, _) = granted(at(21, 0));
    let events = tracker
        .handle_notification_response(NotificationResponse::Action(NotificationAction::Charged))
        .unwrap();
    assert!(matches!(events[1], Event::ChargeMarked { .. }));
    assert_eq!(tracker.streak().streak, 1);

    let opened = tracker
        .handle_notification_response(NotificationResponse::Opened)
        .unwrap();
    assert!(matches!(opened.as_slice(), [Event::NotificationOpened { .. }]));
}

#[test]
fn test_permission_reset_allows_new_prompt() {
    let notifier = RecordingNotifier::denying();
    let (mut tracker, _) = setup(at(12, 0), notifier.clone());
    tracker.request_permission().unwrap();
    tracker.reset_permission().unwrap();
    assert_eq!(tracker.permission(), Permission::Unasked);
    tracker.request_permission().unwrap();
    assert_eq!(notifier.prompt_count(), 2);
}
