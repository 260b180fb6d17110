//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/timer", get(timer_handler))
        .route("/timer/add", post(add_handler))
        .route("/timer/start", post(start_handler))
        .route("/timer/reset", post(reset_handler))
        // Voice assistant mailbox
        .route("/api/timer/set", post(set_command_handler))
        .route("/api/timer/pending", get(pending_command_handler))
        .route("/api/timer/pending/apply", post(apply_command_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
