//! Notification surface.
//!
//! A [`Notifier`] is the platform capability (desktop toast, terminal bell,
//! test recorder). [`NotificationCenter`] wraps it with the permission state
//! machine so nothing is displayed without consent.

mod permission;
mod recording;

pub use permission::{NotificationCenter, Permission};
pub use recording::RecordingNotifier;

use serde::{Deserialize, Serialize};

use crate::error::NotifyError;

pub const REMINDER_TAG: &str = "charge-reminder";
pub const DAILY_TAG: &str = "daily-reminder";

/// Buttons attached to a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationAction {
    /// "Done": record today's charge.
    Charged,
    /// "Later": remind again after the snooze period.
    Snooze,
}

impl NotificationAction {
    pub fn title(self) -> &'static str {
        match self {
            NotificationAction::Charged => "Done, it's charging",
            NotificationAction::Snooze => "Later (1h)",
        }
    }
}

/// What the user did with a displayed notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationResponse {
    /// Body clicked without choosing an action.
    Opened,
    Action(NotificationAction),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    /// Notifications sharing a tag replace each other.
    pub tag: String,
    pub require_interaction: bool,
    pub actions: Vec<NotificationAction>,
}

/// Platform notification capability.
pub trait Notifier: Send {
    fn is_supported(&self) -> bool {
        true
    }

    /// One-time consent prompt. Returns true when the user allows notifications.
    fn prompt_consent(&mut self) -> bool;

    fn show(&mut self, notification: &Notification) -> Result<(), NotifyError>;
}
