//! Error types shared by the storage layer and the timer

use std::path::PathBuf;
use thiserror::Error;

/// Failures of the key-value persistence collaborator
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("storage lock poisoned")]
    Poisoned,
}

/// Errors surfaced to callers of the timer
#[derive(Debug, Error)]
pub enum TimerError {
    /// Rejected `add` amount (zero, negative, or too large)
    #[error("invalid minutes: {0}")]
    InvalidMinutes(i64),

    #[error("failed to persist timer state: {0}")]
    Storage(#[from] StorageError),

    #[error("failed to encode timer state: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to lock {0}")]
    Poisoned(&'static str),
}

impl TimerError {
    /// Whether the error was caused by caller input rather than the host
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, TimerError::InvalidMinutes(_))
    }
}
