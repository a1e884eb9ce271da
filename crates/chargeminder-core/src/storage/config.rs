//! TOML-based application configuration.
//!
//! Holds tuning that the user rarely touches:
//! - Reminder cooldown, daily reminder time and snooze length
//! - Battery drain profile and charge bump range
//! - Notification wording
//!
//! Configuration is stored at `~/.config/chargeminder/config.toml`.
//! Per-user state that changes often (notifications on/off, reminder
//! interval) lives in the key-value store as `AppSettings` instead.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;

/// Which cadence the drain-rate range is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrainProfile {
    /// Percent per hour (3-7 by default).
    Hourly,
    /// Percent per minute (0.5-2 by default).
    PerMinute,
}

/// Reminder scheduling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    #[serde(default = "default_cooldown_minutes")]
    pub cooldown_minutes: u32,
    /// Local wall-clock time of the daily reminder, `HH:MM`.
    #[serde(default = "default_daily_at")]
    pub daily_at: String,
    #[serde(default = "default_snooze_minutes")]
    pub snooze_minutes: u32,
    /// Delay before the in-app alert when notifications are unsupported.
    #[serde(default = "default_fallback_delay_secs")]
    pub fallback_delay_secs: u32,
}

/// Battery simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatteryConfig {
    #[serde(default = "default_drain_profile")]
    pub drain_profile: DrainProfile,
    #[serde(default = "default_hourly_drain_min")]
    pub hourly_drain_min: f64,
    #[serde(default = "default_hourly_drain_max")]
    pub hourly_drain_max: f64,
    #[serde(default = "default_minute_drain_min")]
    pub minute_drain_min: f64,
    #[serde(default = "default_minute_drain_max")]
    pub minute_drain_max: f64,
    #[serde(default = "default_charge_bump_min")]
    pub charge_bump_min: u8,
    #[serde(default = "default_charge_bump_max")]
    pub charge_bump_max: u8,
    /// Reading used when neither a snapshot nor a device probe is available.
    #[serde(default = "default_level")]
    pub default_level: u8,
    #[serde(default = "default_poll_seconds")]
    pub poll_seconds: u32,
}

/// Notification wording.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_body")]
    pub body: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default = "default_daily_title")]
    pub daily_title: String,
    #[serde(default = "default_daily_body")]
    pub daily_body: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/chargeminder/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub reminder: ReminderConfig,
    #[serde(default)]
    pub battery: BatteryConfig,
    #[serde(default)]
    pub notification: NotificationConfig,
}

// Default functions
fn default_cooldown_minutes() -> u32 {
    30
}
fn default_daily_at() -> String {
    "20:00".into()
}
fn default_snooze_minutes() -> u32 {
    60
}
fn default_fallback_delay_secs() -> u32 {
    5
}
fn default_drain_profile() -> DrainProfile {
    DrainProfile::Hourly
}
fn default_hourly_drain_min() -> f64 {
    3.0
}
fn default_hourly_drain_max() -> f64 {
    7.0
}
fn default_minute_drain_min() -> f64 {
    0.5
}
fn default_minute_drain_max() -> f64 {
    2.0
}
fn default_charge_bump_min() -> u8 {
    10
}
fn default_charge_bump_max() -> u8 {
    30
}
fn default_level() -> u8 {
    75
}
fn default_poll_seconds() -> u32 {
    60
}
fn default_title() -> String {
    "Time to charge".into()
}
fn default_body() -> String {
    "Plug your device in before the battery runs out.".into()
}
fn default_icon() -> String {
    "battery-charging".into()
}
fn default_daily_title() -> String {
    "Evening charge check".into()
}
fn default_daily_body() -> String {
    "Charge now so tomorrow starts at full power.".into()
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            cooldown_minutes: default_cooldown_minutes(),
            daily_at: default_daily_at(),
            snooze_minutes: default_snooze_minutes(),
            fallback_delay_secs: default_fallback_delay_secs(),
        }
    }
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            drain_profile: default_drain_profile(),
            hourly_drain_min: default_hourly_drain_min(),
            hourly_drain_max: default_hourly_drain_max(),
            minute_drain_min: default_minute_drain_min(),
            minute_drain_max: default_minute_drain_max(),
            charge_bump_min: default_charge_bump_min(),
            charge_bump_max: default_charge_bump_max(),
            default_level: default_level(),
            poll_seconds: default_poll_seconds(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            body: default_body(),
            icon: default_icon(),
            daily_title: default_daily_title(),
            daily_body: default_daily_body(),
        }
    }
}

impl ReminderConfig {
    /// Parsed `daily_at`.
    pub fn daily_time(&self) -> Result<NaiveTime, ConfigError> {
        NaiveTime::parse_from_str(&self.daily_at, "%H:%M").map_err(|e| {
            ConfigError::InvalidValue {
                key: "reminder.daily_at".into(),
                message: format!("'{}' is not HH:MM ({e})", self.daily_at),
            }
        })
    }
}

impl BatteryConfig {
    /// Drain range in percent per hour, whatever the configured profile.
    pub fn drain_range_per_hour(&self) -> (f64, f64) {
        match self.drain_profile {
            DrainProfile::Hourly => (self.hourly_drain_min, self.hourly_drain_max),
            DrainProfile::PerMinute => (self.minute_drain_min * 60.0, self.minute_drain_max * 60.0),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
                let existing = obj
                    .get(part)
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current
                .get_mut(part)
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        }

        Err(ConfigError::UnknownKey(key.to_string()))
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or create the default file.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or
    /// fails validation, or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.clone(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.clone(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(&path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!("falling back to default config: {e}");
                Self::default()
            }
        }
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key and persist. Returns error if key is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// the result fails validation, or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    /// Set a config value in memory only.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Reject configurations the simulator or scheduler cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.to_string(),
        };

        self.reminder.daily_time()?;
        if self.reminder.cooldown_minutes == 0 {
            return Err(invalid("reminder.cooldown_minutes", "must be greater than zero"));
        }
        if self.reminder.snooze_minutes == 0 {
            return Err(invalid("reminder.snooze_minutes", "must be greater than zero"));
        }
        if self.battery.poll_seconds == 0 {
            return Err(invalid("battery.poll_seconds", "must be greater than zero"));
        }
        let (min, max) = self.battery.drain_range_per_hour();
        if !(min >= 0.0 && min <= max && max.is_finite()) {
            return Err(invalid("battery", "drain range must satisfy 0 <= min <= max"));
        }
        if self.battery.charge_bump_min > self.battery.charge_bump_max {
            return Err(invalid("battery.charge_bump_min", "must not exceed charge_bump_max"));
        }
        if self.battery.charge_bump_max > 100 || self.battery.default_level > 100 {
            return Err(invalid("battery", "percentages must be within 0-100"));
        }
        Ok(())
    }
}
