//! # ChargeMinder Core Library
//!
//! Core logic for ChargeMinder, a daily "did you charge it?" reminder.
//! Everything is available through the standalone `chargeminder` CLI; any
//! other front end is a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Streak**: consecutive-day charge counter with a daily reset check
//! - **Battery**: simulated drain between explicit readings
//! - **Reminders**: interval reminders with a cooldown, a daily one-shot
//!   reminder, and a permission state machine around the notifier
//! - **Storage**: JSON documents in a flat key-value store (SQLite or
//!   memory) and TOML configuration
//!
//! The core owns no threads. [`ChargeTracker::tick`] must be called
//! periodically to run due timers.
//!
//! ## Key Components
//!
//! - [`ChargeTracker`]: the service front ends talk to
//! - [`Store`]: typed access to persisted documents
//! - [`Config`]: application configuration management
//! - [`Event`]: every state change, serializable as JSON

pub mod battery;
pub mod clock;
pub mod error;
pub mod events;
pub mod messages;
pub mod notify;
pub mod records;
pub mod reminder;
pub mod stats;
pub mod storage;
pub mod streak;
pub mod timer;
pub mod tracker;

pub use battery::{BatteryProbe, BatterySimulator, BatterySnapshot, FixedRates, SeededRates};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, NotifyError, StoreError, ValidationError};
pub use events::Event;
pub use notify::{
    Notification, NotificationAction, NotificationResponse, Notifier, Permission,
    RecordingNotifier,
};
pub use records::{AppSettings, ChargeRecord, SettingsPatch};
pub use stats::ChargeStats;
pub use storage::{Config, Database, KeyValueStore, MemoryStore, Store};
pub use streak::{MarkOutcome, StreakState, StreakTier, Urgency};
pub use tracker::ChargeTracker;
