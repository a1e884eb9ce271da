use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::notify::{NotificationAction, Permission};
use crate::records::{AppSettings, ChargeRecord};
use crate::reminder::Suppression;
use crate::stats::ChargeStats;
use crate::streak::{MarkOutcome, StreakTier, Urgency};

/// Every state change produces an Event.
/// The CLI prints them as JSON; tests assert on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// The activation check found a skipped day.
    StreakReset {
        previous: u32,
        at: DateTime<Local>,
    },
    ChargeMarked {
        record: ChargeRecord,
        #[serde(flatten)]
        outcome: MarkOutcome,
        /// Level after the charge bump, when a level was known.
        battery_level: Option<u8>,
        message: String,
        at: DateTime<Local>,
    },
    MarkedForgotten {
        message: String,
        at: DateTime<Local>,
    },
    BatteryUpdated {
        level: u8,
        at: DateTime<Local>,
    },
    HistoryCleared {
        at: DateTime<Local>,
    },
    SettingsUpdated {
        settings: AppSettings,
        at: DateTime<Local>,
    },
    PermissionChanged {
        permission: Permission,
        at: DateTime<Local>,
    },
    RemindersScheduled {
        interval_minutes: u32,
        at: DateTime<Local>,
    },
    RemindersCancelled {
        at: DateTime<Local>,
    },
    ReminderShown {
        tag: String,
        at: DateTime<Local>,
    },
    ReminderSuppressed {
        reason: Suppression,
        at: DateTime<Local>,
    },
    DailyReminderScheduled {
        delay_ms: i64,
        due: DateTime<Local>,
        at: DateTime<Local>,
    },
    /// In-app alert used where system notifications are unavailable.
    FallbackAlert {
        message: String,
        at: DateTime<Local>,
    },
    Snoozed {
        until: DateTime<Local>,
        at: DateTime<Local>,
    },
    /// Notification body clicked without an action.
    NotificationOpened {
        at: DateTime<Local>,
    },
    NotificationActed {
        action: NotificationAction,
        at: DateTime<Local>,
    },
    StatusSnapshot {
        streak: u32,
        tier: StreakTier,
        urgency: Urgency,
        urgency_level: u8,
        charged_today: bool,
        battery_level: u8,
        settings: AppSettings,
        last_charge: Option<ChargeRecord>,
        stats: ChargeStats,
        permission: Permission,
        message: String,
        at: DateTime<Local>,
    },
}

impl Event {
    /// Variant name as it appears in the `type` field.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::StreakReset { .. } => "StreakReset",
            Event::ChargeMarked { .. } => "ChargeMarked",
            Event::MarkedForgotten { .. } => "MarkedForgotten",
            Event::BatteryUpdated { .. } => "BatteryUpdated",
            Event::HistoryCleared { .. } => "HistoryCleared",
            Event::SettingsUpdated { .. } => "SettingsUpdated",
            Event::PermissionChanged { .. } => "PermissionChanged",
            Event::RemindersScheduled { .. } => "RemindersScheduled",
            Event::RemindersCancelled { .. } => "RemindersCancelled",
            Event::ReminderShown { .. } => "ReminderShown",
            Event::ReminderSuppressed { .. } => "ReminderSuppressed",
            Event::DailyReminderScheduled { .. } => "DailyReminderScheduled",
            Event::FallbackAlert { .. } => "FallbackAlert",
            Event::Snoozed { .. } => "Snoozed",
            Event::NotificationOpened { .. } => "NotificationOpened",
            Event::NotificationActed { .. } => "NotificationActed",
            Event::StatusSnapshot { .. } => "StatusSnapshot",
        }
    }
}
