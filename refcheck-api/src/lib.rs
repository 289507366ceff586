//! Refcheck API
//!
//! HTTP surface over the reference validation library: batch validation for
//! sibling services about to store foreign ids, plus dependency health.

pub mod config;
pub mod error;
pub mod observability;
pub mod services;
pub mod state;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::services::{health, validation};
use crate::state::AppState;

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::liveness))
        .route("/health/dependencies", get(health::dependencies))
        .route("/metrics", get(health::metrics))
        .route("/api/validation/batch", post(validation::validate_batch))
        .route("/api/timeouts", get(validation::timeouts))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
