//! Persisted documents: charge history entries and the settings singleton.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

pub const DEFAULT_REMINDER_INTERVAL_MINUTES: u32 = 360;

/// One "mark as charged" action. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeRecord {
    pub id: String,
    /// Local calendar date, `YYYY-MM-DD`.
    pub date: String,
    /// Local wall-clock time, `HH:MM`.
    pub time: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_level: Option<u8>,
}

impl ChargeRecord {
    /// Build a record stamped at `at`.
    pub fn new(at: DateTime<Local>, battery_level: Option<u8>) -> Result<Self, ValidationError> {
        if let Some(level) = battery_level {
            check_level(level as u32)?;
        }
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            date: at.format("%Y-%m-%d").to_string(),
            time: at.format("%H:%M").to_string(),
            timestamp: at.timestamp_millis(),
            battery_level,
        })
    }
}

/// User settings singleton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    #[serde(default = "default_true")]
    pub notifications: bool,
    #[serde(
        default = "default_reminder_interval",
        alias = "reminderInterval"
    )]
    pub reminder_interval_minutes: u32,
    /// RFC 3339 timestamp of the last charge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_charged: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_battery_level: Option<u8>,
    /// Epoch milliseconds of the last battery anchor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_battery_update: Option<i64>,
}

fn default_true() -> bool {
    true
}

fn default_reminder_interval() -> u32 {
    DEFAULT_REMINDER_INTERVAL_MINUTES
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            notifications: true,
            reminder_interval_minutes: DEFAULT_REMINDER_INTERVAL_MINUTES,
            last_charged: None,
            current_battery_level: None,
            last_battery_update: None,
        }
    }
}

/// Partial update merged field by field into [`AppSettings`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub notifications: Option<bool>,
    pub reminder_interval_minutes: Option<u32>,
    pub last_charged: Option<String>,
    pub current_battery_level: Option<u8>,
    pub last_battery_update: Option<i64>,
}

impl SettingsPatch {
    pub fn notifications(enabled: bool) -> Self {
        Self {
            notifications: Some(enabled),
            ..Default::default()
        }
    }

    pub fn reminder_interval(minutes: u32) -> Self {
        Self {
            reminder_interval_minutes: Some(minutes),
            ..Default::default()
        }
    }

    /// Parse a single `key value` pair as typed on the command line.
    ///
    /// Keys accept the camelCase JSON names or their snake_case spelling.
    pub fn from_key_value(key: &str, value: &str) -> Result<Self, ValidationError> {
        let invalid = |message: String| ValidationError::InvalidValue {
            field: key.to_string(),
            message,
        };
        let mut patch = Self::default();
        match key {
            "notifications" => {
                patch.notifications = Some(value.parse().map_err(|_| {
                    invalid(format!("expected true or false, got '{value}'"))
                })?);
            }
            "reminderIntervalMinutes" | "reminder_interval_minutes" | "reminderInterval" => {
                let minutes: u32 = value
                    .parse()
                    .map_err(|_| invalid(format!("expected minutes, got '{value}'")))?;
                patch.reminder_interval_minutes = Some(minutes);
            }
            _ => return Err(invalid("unknown or read-only setting".into())),
        }
        patch.validate()?;
        Ok(patch)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.reminder_interval_minutes == Some(0) {
            return Err(ValidationError::ZeroInterval);
        }
        if let Some(level) = self.current_battery_level {
            check_level(level as u32)?;
        }
        Ok(())
    }

    pub fn apply_to(&self, settings: &mut AppSettings) {
        if let Some(enabled) = self.notifications {
            settings.notifications = enabled;
        }
        if let Some(minutes) = self.reminder_interval_minutes {
            settings.reminder_interval_minutes = minutes;
        }
        if let Some(ref at) = self.last_charged {
            settings.last_charged = Some(at.clone());
        }
        if let Some(level) = self.current_battery_level {
            settings.current_battery_level = Some(level);
        }
        if let Some(at) = self.last_battery_update {
            settings.last_battery_update = Some(at);
        }
    }
}

/// Reject percentages above 100.
pub fn check_level(level: u32) -> Result<u8, ValidationError> {
    if level > 100 {
        return Err(ValidationError::BatteryLevelOutOfRange(level));
    }
    Ok(level as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn record_carries_local_date_and_time() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 21, 5, 0).unwrap();
        let record = ChargeRecord::new(at, Some(85)).unwrap();
        assert_eq!(record.date, "2024-03-09");
        assert_eq!(record.time, "21:05");
        assert_eq!(record.timestamp, at.timestamp_millis());
        assert_eq!(record.battery_level, Some(85));
        assert_eq!(record.id.len(), 36);
    }

    #[test]
    fn record_rejects_level_above_100() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 21, 5, 0).unwrap();
        assert!(ChargeRecord::new(at, Some(101)).is_err());
    }

    #[test]
    fn record_json_uses_camel_case() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 21, 5, 0).unwrap();
        let record = ChargeRecord::new(at, Some(40)).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["batteryLevel"], 40);

        let bare = ChargeRecord::new(at, None).unwrap();
        let json = serde_json::to_value(&bare).unwrap();
        assert!(json.get("batteryLevel").is_none());
    }

    #[test]
    fn settings_accept_legacy_interval_key() {
        let parsed: AppSettings =
            serde_json::from_str(r#"{"notifications":false,"reminderInterval":90}"#).unwrap();
        assert!(!parsed.notifications);
        assert_eq!(parsed.reminder_interval_minutes, 90);
    }

    #[test]
    fn settings_fill_missing_fields() {
        let parsed: AppSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, AppSettings::default());
    }

    #[test]
    fn patch_merges_only_present_fields() {
        let mut settings = AppSettings::default();
        SettingsPatch::reminder_interval(45).apply_to(&mut settings);
        assert_eq!(settings.reminder_interval_minutes, 45);
        assert!(settings.notifications);

        SettingsPatch::notifications(false).apply_to(&mut settings);
        assert!(!settings.notifications);
        assert_eq!(settings.reminder_interval_minutes, 45);
    }

    #[test]
    fn patch_from_key_value() {
        let patch = SettingsPatch::from_key_value("notifications", "false").unwrap();
        assert_eq!(patch.notifications, Some(false));

        let patch = SettingsPatch::from_key_value("reminder_interval_minutes", "120").unwrap();
        assert_eq!(patch.reminder_interval_minutes, Some(120));

        assert!(matches!(
            SettingsPatch::from_key_value("reminderIntervalMinutes", "0"),
            Err(ValidationError::ZeroInterval)
        ));
        assert!(SettingsPatch::from_key_value("lastCharged", "x").is_err());
        assert!(SettingsPatch::from_key_value("notifications", "maybe").is_err());
    }
}
