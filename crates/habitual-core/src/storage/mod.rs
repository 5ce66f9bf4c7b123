mod config;
pub mod database;
pub mod memory;

pub use config::{CalendarConfig, Config, HabitsConfig};
pub use database::Database;
pub use memory::MemoryKv;

use std::path::PathBuf;

use crate::error::StorageError;

/// Key of the habit store record (habits + completion ledger).
pub const STORE_KEY: &str = "habitual.store.v1";
/// Key of the persisted timer session state.
pub const TIMER_KEY: &str = "habitual.timer.v1";
/// Key of the persisted timer session history.
pub const TIMER_HISTORY_KEY: &str = "habitual.timer_history.v1";
/// Key of the theme preference.
pub const THEME_KEY: &str = "habitual.theme";

/// String key-value storage port.
///
/// Everything the core persists goes through this trait, one key per entity.
/// A `write` must be all-or-nothing: readers see either the previous value or
/// the new one, never a partial write.
pub trait KvStore {
    /// Read the value stored under `key`, `None` when absent.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`.
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Erase `key`. Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<K: KvStore + ?Sized> KvStore for &mut K {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Returns `~/.config/habitual[-dev]/` based on HABITUAL_ENV.
///
/// Set HABITUAL_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("HABITUAL_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("habitual-dev")
    } else {
        base_dir.join("habitual")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
