//! Pending timer command posted by the voice assistant

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::TimerError,
    state::TimerMode,
    timer::{Outcome, PersistentTimer},
};

/// What a pending command asks the timer to do
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandMode {
    #[default]
    #[serde(alias = "countdown")]
    Down,
    #[serde(alias = "countup")]
    Up,
    Reset,
}

impl CommandMode {
    pub fn timer_mode(&self) -> Option<TimerMode> {
        match self {
            CommandMode::Down => Some(TimerMode::Countdown),
            CommandMode::Up => Some(TimerMode::Countup),
            CommandMode::Reset => None,
        }
    }
}

/// A timer request waiting to be picked up by the widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerCommand {
    pub minutes: i64,
    pub auto_start: bool,
    pub mode: CommandMode,
    pub timestamp: DateTime<Utc>,
}

impl TimerCommand {
    pub fn new(minutes: i64, auto_start: bool, mode: CommandMode) -> Self {
        Self {
            minutes,
            auto_start,
            mode,
            timestamp: Utc::now(),
        }
    }

    /// Check the command can be applied without touching any timer
    pub fn validate(&self) -> Result<(), TimerError> {
        if self.mode.timer_mode().is_none() || self.minutes <= 0 {
            return Ok(());
        }
        (self.minutes as u64)
            .checked_mul(60)
            .map(|_| ())
            .ok_or(TimerError::InvalidMinutes(self.minutes))
    }

    /// Replace whatever the timer is doing with this command.
    ///
    /// `reset` only resets. Otherwise the timer is reset, `minutes` staged
    /// when positive, and a run started when `auto_start` is set. An invalid
    /// command is rejected before the running timer is reset.
    pub fn apply(&self, timer: &mut PersistentTimer) -> Result<Outcome, TimerError> {
        self.validate()?;
        info!(
            "Applying timer command: {}min mode={:?} auto_start={}",
            self.minutes, self.mode, self.auto_start
        );

        timer.reset();
        let Some(mode) = self.mode.timer_mode() else {
            return Ok(Outcome::Applied);
        };

        if self.minutes > 0 {
            timer.add(self.minutes)?;
        }
        if self.auto_start {
            timer.start(mode)?;
        }
        Ok(Outcome::Applied)
    }
}

/// Single-slot mailbox: a new command replaces the previous one and each
/// command is handed out once.
#[derive(Debug, Default)]
pub struct CommandSlot {
    pending: Option<TimerCommand>,
}

impl CommandSlot {
    pub fn put(&mut self, command: TimerCommand) -> Option<TimerCommand> {
        self.pending.replace(command)
    }

    pub fn peek(&self) -> Option<&TimerCommand> {
        self.pending.as_ref()
    }

    pub fn take(&mut self) -> Option<TimerCommand> {
        self.pending.take()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_none()
    }
}
