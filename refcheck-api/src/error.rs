//! Error handling for the HTTP surface

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use refcheck::BatchValidationError;
use serde_json::json;
use thiserror::Error;

/// Errors returned by API handlers
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request '{0}' has no tenant: set tenantId or the x-company-id header")]
    MissingTenant(String),

    #[error(transparent)]
    Batch(#[from] BatchValidationError),

    #[error("Configuration error: {0}")]
    Config(#[from] refcheck::Error),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingTenant(_) => StatusCode::BAD_REQUEST,
            ApiError::Batch(err) if err.is_programmer_error() => StatusCode::BAD_REQUEST,
            ApiError::Batch(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Config(_) | ApiError::Metrics(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Batch(err) => json!({ "error": err }),
            other => json!({ "error": { "message": other.to_string() } }),
        };

        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        }

        (status, Json(body)).into_response()
    }
}
