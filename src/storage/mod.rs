//! Key-value persistence module
//!
//! The timer only ever talks to storage through [`KeyValueStore`], so the
//! same state machine runs against an in-memory map in tests and a directory
//! of JSON files in the service.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::StorageError;

/// Durable string-valued store addressed by key
pub trait KeyValueStore: Send + Sync {
    /// Read the value for `key`, `None` when absent
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write `value` under `key`, replacing any previous value
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Clearing an absent key succeeds.
    fn clear(&self, key: &str) -> Result<(), StorageError>;
}

/// Reject keys that could escape a storage directory or collide with temp files
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
