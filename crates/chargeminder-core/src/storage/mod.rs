mod config;
pub mod database;
pub mod memory;
pub mod store;

pub use config::{BatteryConfig, Config, DrainProfile, NotificationConfig, ReminderConfig};
pub use database::Database;
pub use memory::MemoryStore;
pub use store::{keys, Store, HISTORY_LIMIT};

use std::path::PathBuf;

use crate::error::{ConfigError, StoreError};

/// Flat string-keyed storage. Values are JSON documents.
///
/// Implementations use interior mutability; all callers run on one logical
/// thread so there is no transaction or locking contract beyond a single call.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Returns `~/.config/chargeminder[-dev]/` based on CHARGEMINDER_ENV.
///
/// Set CHARGEMINDER_ENV=dev to use the development data directory, and
/// CHARGEMINDER_HOME to replace the home directory (used by the CLI tests).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let home = std::env::var_os("CHARGEMINDER_HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    let base_dir = home.join(".config");

    let env = std::env::var("CHARGEMINDER_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("chargeminder-dev")
    } else {
        base_dir.join("chargeminder")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
