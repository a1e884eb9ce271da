//! Reminder timing rules and notification payloads.
//!
//! Everything here is pure; [`crate::tracker::ChargeTracker`] owns the timers
//! and the side effects.

use chrono::{DateTime, Duration, Local, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::notify::{Notification, NotificationAction, DAILY_TAG, REMINDER_TAG};
use crate::storage::NotificationConfig;

/// Why a reminder check did not display anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Suppression {
    /// Notifications are turned off in the settings.
    Disabled,
    PermissionMissing,
    Unsupported,
    /// The previous reminder is too recent.
    Cooldown { remaining_ms: i64 },
}

/// Time from `now` until the next local `target`.
///
/// A target equal to `now` is due immediately; a target already passed
/// today moves to tomorrow.
pub fn delay_until(now: DateTime<Local>, target: NaiveTime) -> Duration {
    let now = now.naive_local();
    let mut next = now.date().and_time(target);
    if now > next {
        next += Duration::days(1);
    }
    next - now
}

/// Remaining cooldown after a reminder shown at `last_ms`, if any.
///
/// `last_ms == 0` means no reminder was ever shown.
pub fn cooldown_remaining(last_ms: i64, now_ms: i64, cooldown: Duration) -> Option<i64> {
    if last_ms == 0 {
        return None;
    }
    let elapsed = now_ms.saturating_sub(last_ms);
    let cooldown_ms = cooldown.num_milliseconds();
    (elapsed < cooldown_ms).then(|| cooldown_ms - elapsed)
}

/// Interval reminder with "charged" and "snooze" buttons. Stays on screen
/// until answered.
pub fn interval_reminder(config: &NotificationConfig) -> Notification {
    Notification {
        title: config.title.clone(),
        body: config.body.clone(),
        icon: config.icon.clone(),
        tag: REMINDER_TAG.into(),
        require_interaction: true,
        actions: vec![NotificationAction::Charged, NotificationAction::Snooze],
    }
}

pub fn daily_reminder(config: &NotificationConfig) -> Notification {
    Notification {
        title: config.daily_title.clone(),
        body: config.daily_body.clone(),
        icon: config.icon.clone(),
        tag: DAILY_TAG.into(),
        require_interaction: false,
        actions: Vec::new(),
    }
}
