use serde::{Deserialize, Serialize};

use super::{Notification, Notifier};
use crate::error::NotifyError;

/// Notification permission.
///
/// ```text
/// Unasked --prompt: yes--> Granted
///    |
///    +-----prompt: no----> Denied   (terminal until reset())
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    #[default]
    Unasked,
    Granted,
    Denied,
}

impl Permission {
    pub fn is_granted(self) -> bool {
        self == Permission::Granted
    }
}

/// Notifier plus its permission state.
pub struct NotificationCenter {
    notifier: Box<dyn Notifier>,
    permission: Permission,
}

impl NotificationCenter {
    pub fn new(notifier: Box<dyn Notifier>, permission: Permission) -> Self {
        Self {
            notifier,
            permission,
        }
    }

    pub fn permission(&self) -> Permission {
        self.permission
    }

    pub fn is_supported(&self) -> bool {
        self.notifier.is_supported()
    }

    /// Ask for consent if it was never asked. Settled states are returned
    /// as-is without prompting again.
    pub fn request_permission(&mut self) -> Permission {
        if self.permission != Permission::Unasked || !self.notifier.is_supported() {
            return self.permission;
        }
        self.permission = if self.notifier.prompt_consent() {
            Permission::Granted
        } else {
            Permission::Denied
        };
        tracing::info!(permission = ?self.permission, "notification permission settled");
        self.permission
    }

    /// Forget the recorded decision, as a browser-level reset would.
    pub fn reset(&mut self) {
        self.permission = Permission::Unasked;
    }

    /// Display `notification` if the surface supports it and consent was given.
    pub fn deliver(&mut self, notification: &Notification) -> Result<(), NotifyError> {
        if !self.notifier.is_supported() {
            return Err(NotifyError::Unsupported);
        }
        if !self.permission.is_granted() {
            return Err(NotifyError::NotPermitted);
        }
        self.notifier.show(notification)
    }
}
