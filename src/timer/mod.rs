//! Timer module
//!
//! The drift-free persistent timer, the clocks it reads, and display helpers.

pub mod clock;
pub mod display;
pub mod persistent;

pub use clock::{Clock, ManualClock, SystemClock};
pub use display::format_hms;
pub use persistent::{
    Outcome, PersistentTimer, Tick, TimerEvent, TimerStatus, DEFAULT_STORAGE_KEY,
};
