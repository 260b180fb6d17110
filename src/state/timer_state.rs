//! Persisted timer record and the wall-clock arithmetic derived from it

use serde::{Deserialize, Serialize};

/// Direction of a timer run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    #[serde(alias = "down")]
    Countdown,
    #[serde(alias = "up")]
    Countup,
}

impl TimerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerMode::Countdown => "countdown",
            TimerMode::Countup => "countup",
        }
    }
}

impl std::fmt::Display for TimerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The record written to storage while a timer is running.
///
/// All timestamps are epoch milliseconds. Displayed values are always
/// recomputed from these timestamps and the current time, never accumulated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub mode: TimerMode,
    pub start_at: i64,
    pub initial_seconds: u64,
    /// When a countdown reaches zero; only present for countdowns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_time: Option<i64>,
}

impl TimerState {
    /// Build the record for a run beginning at `now_ms`
    pub fn begin(mode: TimerMode, now_ms: i64, initial_seconds: u64) -> Self {
        let target_time = match mode {
            TimerMode::Countdown => Some(now_ms.saturating_add(secs_to_millis(initial_seconds))),
            TimerMode::Countup => None,
        };

        Self {
            mode,
            start_at: now_ms,
            initial_seconds,
            target_time,
        }
    }

    /// Check the invariants a freshly begun record satisfies
    pub fn is_consistent(&self) -> bool {
        match (self.mode, self.target_time) {
            (TimerMode::Countdown, Some(target)) => {
                target == self.start_at.saturating_add(secs_to_millis(self.initial_seconds))
            }
            (TimerMode::Countdown, None) => false,
            (TimerMode::Countup, _) => true,
        }
    }

    /// Seconds left on a countdown, rounded up. Zero or negative once the
    /// target has passed. `None` for count-ups.
    pub fn remaining_seconds(&self, now_ms: i64) -> Option<i64> {
        self.target_time
            .filter(|_| self.mode == TimerMode::Countdown)
            .map(|target| ceil_div_millis(target.saturating_sub(now_ms)))
    }

    /// Whole seconds since the run began, rounded down
    pub fn elapsed_seconds(&self, now_ms: i64) -> i64 {
        now_ms.saturating_sub(self.start_at).div_euclid(1000)
    }

    /// Value to display at `now_ms`, never negative
    pub fn display_seconds(&self, now_ms: i64) -> u64 {
        match self.mode {
            TimerMode::Countdown => self
                .remaining_seconds(now_ms)
                .map(|r| r.max(0) as u64)
                .unwrap_or(0),
            TimerMode::Countup => {
                let elapsed = self.elapsed_seconds(now_ms);
                // A clock that stepped backwards must not underflow the display
                if elapsed < 0 {
                    self.initial_seconds.saturating_sub(elapsed.unsigned_abs())
                } else {
                    self.initial_seconds.saturating_add(elapsed as u64)
                }
            }
        }
    }

    /// True once a countdown's remaining time has reached zero
    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.remaining_seconds(now_ms).is_some_and(|r| r <= 0)
    }
}

fn secs_to_millis(seconds: u64) -> i64 {
    i64::try_from(seconds)
        .unwrap_or(i64::MAX)
        .saturating_mul(1000)
}

/// `ceil(millis / 1000)` for any sign
fn ceil_div_millis(millis: i64) -> i64 {
    -(millis.saturating_neg().div_euclid(1000))
}
