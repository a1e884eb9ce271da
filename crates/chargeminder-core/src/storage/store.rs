//! Typed accessors over a [`KeyValueStore`].
//!
//! Every document is JSON under a fixed key. Reads never fail: a missing,
//! unreadable or malformed value yields the default and a warning in the log.
//! Writes return errors to the caller.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::KeyValueStore;
use crate::battery::BatterySnapshot;
use crate::error::Result;
use crate::notify::Permission;
use crate::records::{AppSettings, ChargeRecord, SettingsPatch};
use crate::streak::StreakState;

/// Maximum number of charge records kept, newest first.
pub const HISTORY_LIMIT: usize = 100;

pub mod keys {
    pub const CHARGE_HISTORY: &str = "charge-history";
    pub const SETTINGS: &str = "app-settings";
    pub const LAST_NOTIFICATION: &str = "last-notification";
    pub const BATTERY_LEVEL: &str = "current-battery-level";
    pub const STREAK: &str = "streak-state";
    pub const PERMISSION: &str = "notification-permission";
}

pub struct Store<S> {
    backend: S,
}

impl<S: KeyValueStore> Store<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key, "store read failed, using default: {e}");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, "malformed stored value, using default: {e}");
                None
            }
        }
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.backend.set(key, &json)?;
        Ok(())
    }

    // ── Charge history ───────────────────────────────────────────────

    pub fn charge_history(&self) -> Vec<ChargeRecord> {
        self.read(keys::CHARGE_HISTORY).unwrap_or_default()
    }

    /// Prepend `record` and drop anything past [`HISTORY_LIMIT`].
    pub fn push_charge_record(&self, record: ChargeRecord) -> Result<ChargeRecord> {
        let mut history = self.charge_history();
        history.insert(0, record.clone());
        history.truncate(HISTORY_LIMIT);
        self.write(keys::CHARGE_HISTORY, &history)?;
        Ok(record)
    }

    pub fn clear_history(&self) -> Result<()> {
        self.backend.remove(keys::CHARGE_HISTORY)?;
        Ok(())
    }

    // ── Settings ─────────────────────────────────────────────────────

    pub fn settings(&self) -> AppSettings {
        self.read(keys::SETTINGS).unwrap_or_default()
    }

    /// Merge `patch` into the stored settings and persist the result.
    pub fn update_settings(&self, patch: &SettingsPatch) -> Result<AppSettings> {
        patch.validate()?;
        let mut settings = self.settings();
        patch.apply_to(&mut settings);
        self.write(keys::SETTINGS, &settings)?;
        Ok(settings)
    }

    /// Overwrite the settings with defaults.
    pub fn reset_settings(&self) -> Result<AppSettings> {
        let settings = AppSettings::default();
        self.write(keys::SETTINGS, &settings)?;
        Ok(settings)
    }

    // ── Notifications ────────────────────────────────────────────────

    /// Epoch ms of the last reminder shown, 0 if never.
    pub fn last_notification_time(&self) -> i64 {
        self.read(keys::LAST_NOTIFICATION).unwrap_or(0)
    }

    pub fn set_last_notification_time(&self, at_ms: i64) -> Result<()> {
        self.write(keys::LAST_NOTIFICATION, &at_ms)
    }

    pub fn permission(&self) -> Permission {
        self.read(keys::PERMISSION).unwrap_or_default()
    }

    pub fn set_permission(&self, permission: Permission) -> Result<()> {
        self.write(keys::PERMISSION, &permission)
    }

    // ── Battery ──────────────────────────────────────────────────────

    /// Last anchored reading. A stored level above 100 counts as malformed.
    pub fn battery_snapshot(&self) -> Option<BatterySnapshot> {
        let snapshot: BatterySnapshot = self.read(keys::BATTERY_LEVEL)?;
        if snapshot.level > 100 {
            tracing::warn!(
                key = keys::BATTERY_LEVEL,
                level = snapshot.level,
                "stored battery level out of range, ignoring"
            );
            return None;
        }
        Some(snapshot)
    }

    pub fn set_battery_snapshot(&self, snapshot: &BatterySnapshot) -> Result<()> {
        self.write(keys::BATTERY_LEVEL, snapshot)
    }

    // ── Streak ───────────────────────────────────────────────────────

    pub fn streak(&self) -> StreakState {
        self.read(keys::STREAK).unwrap_or_default()
    }

    pub fn set_streak(&self, state: &StreakState) -> Result<()> {
        self.write(keys::STREAK, state)
    }
}
