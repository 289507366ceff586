//! Batch validation endpoints

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, Json};
use chrono::{DateTime, Utc};
use refcheck::config::HierarchyViolation;
use refcheck::{BatchOptions, BatchResults, TimeoutTier, ValidationRequest, TENANT_HEADER};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

/// One entry of an inbound batch
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    pub kind: String,
    pub id: String,
    pub key: String,
    #[serde(default)]
    pub tenant_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequestBody {
    pub requests: Vec<BatchItem>,
    #[serde(default)]
    pub options: BatchOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    pub results: BatchResults,
    pub checked_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct TimeoutsResponse {
    pub budgets: BTreeMap<&'static str, u64>,
    pub violations: Vec<HierarchyViolation>,
}

/// Tenant from the inbound header, if any
fn header_tenant(headers: &HeaderMap) -> Option<String> {
    headers
        .get(TENANT_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Resolve each item's tenant, falling back to the header
fn into_requests(
    items: Vec<BatchItem>,
    default_tenant: Option<String>,
) -> Result<Vec<ValidationRequest>, ApiError> {
    items
        .into_iter()
        .map(|item| {
            let tenant = item
                .tenant_id
                .filter(|tenant| !tenant.trim().is_empty())
                .or_else(|| default_tenant.clone())
                .ok_or_else(|| ApiError::MissingTenant(item.key.clone()))?;
            Ok(ValidationRequest::with_raw_kind(item.kind, item.id, tenant, item.key))
        })
        .collect()
}

/// `POST /api/validation/batch`
pub async fn validate_batch(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<BatchRequestBody>,
) -> Result<Json<BatchResponse>, ApiError> {
    let requests = into_requests(body.requests, header_tenant(&headers))?;

    // each outbound call carries its own internal-service deadline
    let timer = state.metrics.batch_duration.start_timer();
    let outcome = state
        .coordinator
        .validate_batch(&requests, body.options)
        .await;
    timer.observe_duration();

    state.metrics.record_batch(&outcome);
    let results = outcome?;

    info!(size = requests.len(), "validation batch accepted");
    Ok(Json(BatchResponse {
        results,
        checked_at: Utc::now(),
    }))
}

/// `GET /api/timeouts`
pub async fn timeouts(State(state): State<Arc<AppState>>) -> Json<TimeoutsResponse> {
    let budgets = TimeoutTier::ALL
        .into_iter()
        .map(|tier| (tier.as_str(), state.budgets.budget(tier).as_millis() as u64))
        .collect();

    Json(TimeoutsResponse {
        budgets,
        violations: state.budgets.hierarchy_violations(),
    })
}
