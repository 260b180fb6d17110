//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use tracing::{error, info, warn};

use crate::{
    error::TimerError,
    state::{AppState, TimerCommand, TimerSnapshot},
    timer::Outcome,
};
use super::responses::{
    AddRequest, ApiResponse, CommandAccepted, HealthResponse, PendingResponse, SetCommandRequest,
    StartRequest, StatusResponse,
};

fn status_for(context: &str, e: &TimerError) -> StatusCode {
    if e.is_invalid_input() {
        warn!("Rejected {}: {}", context, e);
        StatusCode::BAD_REQUEST
    } else {
        error!("Failed to {}: {}", context, e);
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn snapshot(state: &AppState) -> Result<TimerSnapshot, StatusCode> {
    state
        .snapshot()
        .map_err(|e| status_for("read timer snapshot", &e))
}

fn respond(
    state: &AppState,
    outcome: Outcome,
    applied: String,
    ignored: &str,
) -> Result<Json<ApiResponse>, StatusCode> {
    let timer = snapshot(state)?;
    Ok(Json(match outcome {
        Outcome::Applied => ApiResponse::applied(applied, timer),
        Outcome::Ignored => ApiResponse::ignored(ignored.to_string(), timer),
    }))
}

/// Handle GET /timer - Current timer snapshot
pub async fn timer_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimerSnapshot>, StatusCode> {
    snapshot(&state).map(Json)
}

/// Handle POST /timer/add - Stage more minutes while idle
pub async fn add_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddRequest>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let outcome = state
        .add_minutes(req.minutes)
        .map_err(|e| status_for("add minutes", &e))?;

    respond(
        &state,
        outcome,
        format!("Added {} minutes", req.minutes),
        "Timer is running; minutes not added",
    )
}

/// Handle POST /timer/start - Start a countdown or count-up
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StartRequest>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let outcome = state
        .start_timer(req.mode)
        .map_err(|e| status_for("start timer", &e))?;

    if outcome == Outcome::Applied {
        info!("Start endpoint called - {} timer running", req.mode);
    }
    respond(
        &state,
        outcome,
        format!("Started {} timer", req.mode),
        "Timer is already running",
    )
}

/// Handle POST /timer/reset - Stop and clear the timer
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    state
        .reset_timer()
        .map_err(|e| status_for("reset timer", &e))?;

    info!("Reset endpoint called - timer cleared");
    respond(&state, Outcome::Applied, "Timer reset".to_string(), "")
}

/// Handle POST /api/timer/set - Queue a voice timer command
pub async fn set_command_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetCommandRequest>,
) -> Result<Json<CommandAccepted>, StatusCode> {
    let minutes = req.minutes;
    state
        .set_pending_command(TimerCommand::new(req.minutes, req.auto_start, req.mode))
        .map_err(|e| status_for("queue timer command", &e))?;

    Ok(Json(CommandAccepted {
        status: "success".to_string(),
        minutes,
    }))
}

/// Handle GET /api/timer/pending - Hand out the queued command once
pub async fn pending_command_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PendingResponse>, StatusCode> {
    state
        .take_pending_command()
        .map(|command| Json(PendingResponse::from(command)))
        .map_err(|e| status_for("take timer command", &e))
}

/// Handle POST /api/timer/pending/apply - Apply the queued command to the hosted timer
pub async fn apply_command_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let applied = state
        .apply_pending_command()
        .map_err(|e| status_for("apply timer command", &e))?;

    match applied {
        Some(command) => respond(
            &state,
            Outcome::Applied,
            format!("Applied {:?} command for {} minutes", command.mode, command.minutes),
            "",
        ),
        None => respond(&state, Outcome::Ignored, String::new(), "No pending timer command"),
    }
}

/// Handle GET /status - Return timer and server status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let timer = snapshot(&state)?;
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
