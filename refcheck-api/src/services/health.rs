//! Health and metrics endpoints

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use refcheck::ServiceHealth;
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyHealthResponse {
    pub healthy: bool,
    pub services: BTreeMap<String, bool>,
    pub details: Vec<ServiceHealth>,
    pub checked_at: DateTime<Utc>,
}

/// `GET /health` - liveness of this process only
pub async fn liveness() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "refcheck-api",
        "version": env!("CARGO_PKG_VERSION"),
        "refcheckVersion": refcheck::VERSION,
    }))
}

/// `GET /health/dependencies` - 503 unless every sibling answered
pub async fn dependencies(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<DependencyHealthResponse>) {
    let details = state.health.health_report().await;
    state.metrics.record_health(&details);

    let services: BTreeMap<String, bool> = details
        .iter()
        .map(|health| (health.service.clone(), health.healthy))
        .collect();
    let healthy = services.values().all(|up| *up);
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(DependencyHealthResponse {
            healthy,
            services,
            details,
            checked_at: Utc::now(),
        }),
    )
}

/// `GET /metrics` - Prometheus text exposition
pub async fn metrics(State(state): State<Arc<AppState>>) -> Result<String, ApiError> {
    Ok(state.metrics.render()?)
}
