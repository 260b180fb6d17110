//! State management module
//!
//! This module contains the persisted timer record, the pending command
//! mailbox, and the shared application state.

pub mod app_state;
pub mod command;
pub mod timer_state;

// Re-export main types
pub use app_state::{AppState, TimerSnapshot};
pub use command::{CommandMode, CommandSlot, TimerCommand};
pub use timer_state::{TimerMode, TimerState};
