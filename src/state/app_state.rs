//! Main application state management

use std::{
    sync::{Mutex, MutexGuard},
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{info, warn};

use super::{CommandSlot, TimerCommand, TimerMode, TimerState};
use crate::{
    error::TimerError,
    timer::{format_hms, Outcome, PersistentTimer, Tick, TimerEvent, TimerStatus},
};

/// Point-in-time view of the hosted timer, as served to the widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub status: String,
    pub mode: Option<TimerMode>,
    pub display_seconds: u64,
    pub display: String,
    pub pending_seconds: u64,
    pub state: Option<TimerState>,
    pub last_expired_at: Option<DateTime<Utc>>,
}

/// Shared state behind the HTTP handlers and the ticker task
#[derive(Debug)]
pub struct AppState {
    /// The single hosted timer
    pub timer: Mutex<PersistentTimer>,
    /// Pending voice command mailbox
    pub commands: Mutex<CommandSlot>,
    /// How often the ticker recomputes a running timer
    pub tick_interval: Duration,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
    pub last_expired_at: Mutex<Option<DateTime<Utc>>>,
}

impl AppState {
    pub fn new(timer: PersistentTimer, port: u16, host: String, tick_interval: Duration) -> Self {
        Self {
            timer: Mutex::new(timer),
            commands: Mutex::new(CommandSlot::default()),
            tick_interval,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            last_expired_at: Mutex::new(None),
        }
    }

    fn lock_timer(&self) -> Result<MutexGuard<'_, PersistentTimer>, TimerError> {
        self.timer.lock().map_err(|_| TimerError::Poisoned("timer"))
    }

    fn lock_commands(&self) -> Result<MutexGuard<'_, CommandSlot>, TimerError> {
        self.commands.lock().map_err(|_| TimerError::Poisoned("command slot"))
    }

    /// Run a user action against the timer and record it as the last action
    pub fn with_timer<F, R>(&self, action: &str, f: F) -> Result<R, TimerError>
    where
        F: FnOnce(&mut PersistentTimer) -> Result<R, TimerError>,
    {
        let mut timer = self.lock_timer()?;
        let result = f(&mut *timer)?;
        drop(timer); // Release the lock early

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }

        Ok(result)
    }

    pub fn add_minutes(&self, minutes: i64) -> Result<Outcome, TimerError> {
        self.with_timer("add", |timer| timer.add(minutes))
    }

    pub fn start_timer(&self, mode: TimerMode) -> Result<Outcome, TimerError> {
        self.with_timer("start", |timer| timer.start(mode))
    }

    pub fn reset_timer(&self) -> Result<(), TimerError> {
        self.with_timer("reset", |timer| {
            timer.reset();
            Ok(())
        })
    }

    /// Periodic recomputation; not recorded as a user action
    pub fn tick_timer(&self) -> Result<Tick, TimerError> {
        Ok(self.lock_timer()?.tick())
    }

    pub fn timer_status(&self) -> Result<TimerStatus, TimerError> {
        Ok(self.lock_timer()?.status())
    }

    pub fn subscribe_timer_events(&self) -> Result<broadcast::Receiver<TimerEvent>, TimerError> {
        Ok(self.lock_timer()?.subscribe())
    }

    pub fn snapshot(&self) -> Result<TimerSnapshot, TimerError> {
        let timer = self.lock_timer()?;
        let status = timer.status();
        let display_seconds = timer.current_display_seconds();

        Ok(TimerSnapshot {
            status: if status.is_running() { "running" } else { "idle" }.to_string(),
            mode: status.mode(),
            display_seconds,
            display: format_hms(display_seconds),
            pending_seconds: timer.pending_seconds(),
            state: timer.persisted().cloned(),
            last_expired_at: self.last_expired_at.lock().ok().and_then(|t| *t),
        })
    }

    /// Remember when the last countdown ran out
    pub fn record_expiry(&self) {
        match self.last_expired_at.lock() {
            Ok(mut at) => *at = Some(Utc::now()),
            Err(e) => warn!("Failed to record timer expiry: {}", e),
        }
    }

    /// Queue a voice command, replacing any command not yet picked up
    pub fn set_pending_command(&self, command: TimerCommand) -> Result<(), TimerError> {
        info!(
            "Timer command queued: {}min (mode: {:?}, auto_start: {})",
            command.minutes, command.mode, command.auto_start
        );
        if let Some(previous) = self.lock_commands()?.put(command) {
            warn!("Dropping unconsumed timer command from {}", previous.timestamp);
        }
        Ok(())
    }

    pub fn take_pending_command(&self) -> Result<Option<TimerCommand>, TimerError> {
        Ok(self.lock_commands()?.take())
    }

    /// Consume the pending command and apply it to the hosted timer.
    /// Returns the command that was applied, if there was one. An invalid
    /// command is left queued and the timer is not touched.
    pub fn apply_pending_command(&self) -> Result<Option<TimerCommand>, TimerError> {
        let command = {
            let mut slot = self.lock_commands()?;
            match slot.peek() {
                Some(command) => command.validate()?,
                None => return Ok(None),
            }
            slot.take()
        };
        let Some(command) = command else {
            return Ok(None);
        };
        self.with_timer("command", |timer| command.apply(timer))?;
        Ok(Some(command))
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
