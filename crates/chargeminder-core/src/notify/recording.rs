use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::{Notification, Notifier};
use crate::error::NotifyError;

/// Notifier that keeps what it was asked to show.
///
/// Clones share state, so a test can hand one clone to the tracker and
/// inspect the other.
#[derive(Debug, Clone)]
pub struct RecordingNotifier {
    shown: Arc<Mutex<Vec<Notification>>>,
    prompts: Arc<AtomicUsize>,
    consent: bool,
    supported: bool,
}

impl RecordingNotifier {
    pub fn granting() -> Self {
        Self::with(true, true)
    }

    pub fn denying() -> Self {
        Self::with(false, true)
    }

    pub fn unsupported() -> Self {
        Self::with(false, false)
    }

    fn with(consent: bool, supported: bool) -> Self {
        Self {
            shown: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(AtomicUsize::new(0)),
            consent,
            supported,
        }
    }

    pub fn shown(&self) -> Vec<Notification> {
        self.shown.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }
}

impl Notifier for RecordingNotifier {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn prompt_consent(&mut self) -> bool {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        self.consent
    }

    fn show(&mut self, notification: &Notification) -> Result<(), NotifyError> {
        self.shown
            .lock()
            .map_err(|e| NotifyError::DeliveryFailed(e.to_string()))?
            .push(notification.clone());
        Ok(())
    }
}
