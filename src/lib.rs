//! DevGotchi Timer - a persistent, drift-free countdown/count-up timer
//!
//! The timer's state is persisted as wall-clock timestamps, so the displayed
//! value survives missed ticks, suspension and process restarts. The crate
//! also ships a small HTTP service hosting one timer for the widget.

pub mod api;
pub mod config;
pub mod error;
pub mod state;
pub mod storage;
pub mod tasks;
pub mod timer;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::{StorageError, TimerError};
pub use state::{AppState, TimerMode, TimerState};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use timer::{Clock, PersistentTimer, SystemClock, TimerEvent, TimerStatus};
pub use utils::signals::shutdown_signal;
