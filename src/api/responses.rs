//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{CommandMode, TimerCommand, TimerMode, TimerSnapshot};

/// Body of `POST /timer/add`
#[derive(Debug, Clone, Deserialize)]
pub struct AddRequest {
    pub minutes: i64,
}

/// Body of `POST /timer/start`
#[derive(Debug, Clone, Deserialize)]
pub struct StartRequest {
    pub mode: TimerMode,
}

/// Body of `POST /api/timer/set`, as sent by the voice assistant
#[derive(Debug, Clone, Deserialize)]
pub struct SetCommandRequest {
    #[serde(default)]
    pub minutes: i64,
    #[serde(default = "default_auto_start")]
    pub auto_start: bool,
    #[serde(default)]
    pub mode: CommandMode,
}

fn default_auto_start() -> bool {
    true
}

/// API response structure for timer action endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerSnapshot,
}

impl ApiResponse {
    pub fn new(status: &str, message: String, timer: TimerSnapshot) -> Self {
        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            timer,
        }
    }

    pub fn applied(message: String, timer: TimerSnapshot) -> Self {
        Self::new("applied", message, timer)
    }

    /// The action was valid but had no effect in the timer's current state
    pub fn ignored(message: String, timer: TimerSnapshot) -> Self {
        Self::new("ignored", message, timer)
    }
}

/// Acknowledgement for `POST /api/timer/set`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandAccepted {
    pub status: String,
    pub minutes: i64,
}

/// Response of `GET /api/timer/pending`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingResponse {
    pub has_command: bool,
    #[serde(flatten)]
    pub command: Option<TimerCommand>,
}

impl From<Option<TimerCommand>> for PendingResponse {
    fn from(command: Option<TimerCommand>) -> Self {
        Self {
            has_command: command.is_some(),
            command,
        }
    }
}

/// Status response with timer and server information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: TimerSnapshot,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
