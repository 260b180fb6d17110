//! The persistent countdown / count-up timer
//!
//! A [`PersistentTimer`] is either idle, holding a staged number of seconds,
//! or running, in which case a [`TimerState`] lives in storage under the
//! timer's key. Every displayed value is derived from that record and the
//! clock, so missed ticks, suspended processes and restarts never make the
//! timer drift.

use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::{
    error::TimerError,
    state::{TimerMode, TimerState},
    storage::KeyValueStore,
    timer::Clock,
};

/// Storage key used by the widget
pub const DEFAULT_STORAGE_KEY: &str = "devgotchi_timer";

const EVENT_CAPACITY: usize = 32;

/// Coarse state of the timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    Idle,
    Running(TimerMode),
}

impl TimerStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, TimerStatus::Running(_))
    }

    pub fn mode(&self) -> Option<TimerMode> {
        match self {
            TimerStatus::Idle => None,
            TimerStatus::Running(mode) => Some(*mode),
        }
    }
}

/// Result of an action that may be silently ignored in the wrong state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// The action is not valid in the current state and changed nothing
    Ignored,
}

/// Result of one periodic recomputation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Idle,
    Running { display_seconds: u64 },
    Expired,
}

/// Lifecycle notifications, broadcast to every subscriber
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    Started(TimerState),
    Reset,
    /// A countdown reached zero. Sent exactly once per run.
    Expired { target_time: i64 },
    /// The persisted record vanished underneath a running timer
    Cleared,
}

pub struct PersistentTimer {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    key: String,
    pending_seconds: u64,
    running: Option<TimerState>,
    events: broadcast::Sender<TimerEvent>,
}

impl std::fmt::Debug for PersistentTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentTimer")
            .field("key", &self.key)
            .field("pending_seconds", &self.pending_seconds)
            .field("running", &self.running)
            .finish_non_exhaustive()
    }
}

impl PersistentTimer {
    /// Create the timer for `key`, resuming any run found in storage.
    ///
    /// A valid persisted record puts the timer straight into `Running` with
    /// its display fast-forwarded to the current time. Unreadable or
    /// corrupted records leave it `Idle`.
    pub fn attach(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        key: impl Into<String>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let mut timer = Self {
            store,
            clock,
            key: key.into(),
            pending_seconds: 0,
            running: None,
            events,
        };

        if let Some(state) = timer.load_persisted() {
            let now = timer.clock.now_millis();
            info!(
                "Resuming {} timer from {:?} at {}s",
                state.mode,
                timer.key(),
                state.display_seconds(now)
            );
            timer.running = Some(state);
        }

        timer
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn status(&self) -> TimerStatus {
        match &self.running {
            Some(state) => TimerStatus::Running(state.mode),
            None => TimerStatus::Idle,
        }
    }

    /// The record backing the current run, if any
    pub fn persisted(&self) -> Option<&TimerState> {
        self.running.as_ref()
    }

    /// Seconds staged by `add` for the next run
    pub fn pending_seconds(&self) -> u64 {
        self.pending_seconds
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.events.subscribe()
    }

    /// Stage `minutes` more for the next run
    pub fn add(&mut self, minutes: i64) -> Result<Outcome, TimerError> {
        if minutes <= 0 {
            return Err(TimerError::InvalidMinutes(minutes));
        }
        if self.running.is_some() {
            debug!("Ignoring add({}) while running", minutes);
            return Ok(Outcome::Ignored);
        }

        let added = (minutes as u64)
            .checked_mul(60)
            .and_then(|secs| self.pending_seconds.checked_add(secs))
            .ok_or(TimerError::InvalidMinutes(minutes))?;

        self.pending_seconds = added;
        debug!("Staged {} seconds", self.pending_seconds);
        Ok(Outcome::Applied)
    }

    /// Begin a run from the staged seconds.
    ///
    /// The record is persisted before the timer counts as running; when the
    /// write fails the timer stays idle and the error is returned.
    pub fn start(&mut self, mode: TimerMode) -> Result<Outcome, TimerError> {
        if let Some(current) = &self.running {
            debug!("Ignoring start({}) while {} is running", mode, current.mode);
            return Ok(Outcome::Ignored);
        }

        let state = TimerState::begin(mode, self.clock.now_millis(), self.pending_seconds);
        let encoded = serde_json::to_string(&state)?;
        self.store.save(&self.key, &encoded)?;

        info!("Started {} timer at {}s", mode, state.initial_seconds);
        self.running = Some(state.clone());
        let _ = self.events.send(TimerEvent::Started(state));
        Ok(Outcome::Applied)
    }

    /// Stop any run, clear storage and the staged seconds. Never fails:
    /// a storage error is logged and the timer is idle regardless.
    pub fn reset(&mut self) {
        if let Err(e) = self.store.clear(&self.key) {
            warn!("Failed to clear persisted timer state: {}", e);
        }

        let was_running = self.running.take().is_some();
        self.pending_seconds = 0;
        info!("Timer reset (was {})", if was_running { "running" } else { "idle" });
        let _ = self.events.send(TimerEvent::Reset);
    }

    /// Recompute from storage and the clock; expires a finished countdown
    pub fn tick(&mut self) -> Tick {
        if self.running.is_none() {
            return Tick::Idle;
        }

        let Some(state) = self.load_persisted() else {
            info!("Persisted timer state disappeared, stopping");
            self.running = None;
            self.pending_seconds = 0;
            let _ = self.events.send(TimerEvent::Cleared);
            return Tick::Idle;
        };

        if self.running.as_ref() != Some(&state) {
            info!("Adopting {} timer state written by another instance", state.mode);
        }

        let now = self.clock.now_millis();
        if state.is_expired(now) {
            self.expire(&state);
            return Tick::Expired;
        }

        let display_seconds = state.display_seconds(now);
        debug!("Tick: {}s ({})", display_seconds, state.mode);
        self.running = Some(state);
        Tick::Running { display_seconds }
    }

    /// Value the UI should show right now
    pub fn current_display_seconds(&self) -> u64 {
        match &self.running {
            Some(state) => state.display_seconds(self.clock.now_millis()),
            None => self.pending_seconds,
        }
    }

    fn expire(&mut self, state: &TimerState) {
        if let Err(e) = self.store.clear(&self.key) {
            warn!("Failed to clear expired timer state: {}", e);
        }
        self.running = None;
        self.pending_seconds = 0;

        info!("Time up!");
        let _ = self.events.send(TimerEvent::Expired {
            target_time: state.target_time.unwrap_or(state.start_at),
        });
    }

    /// Read the persisted record, treating failures and corruption as absent
    fn load_persisted(&self) -> Option<TimerState> {
        let raw = match self.store.load(&self.key) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Failed to read persisted timer state: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<TimerState>(&raw) {
            Ok(state) if state.is_consistent() => Some(state),
            Ok(_) | Err(_) => {
                warn!("Discarding corrupted timer state under {:?}", self.key);
                if let Err(e) = self.store.clear(&self.key) {
                    warn!("Failed to clear corrupted timer state: {}", e);
                }
                None
            }
        }
    }
}
