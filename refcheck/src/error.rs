//! Error types for the refcheck library

use serde::Serialize;
use thiserror::Error;

/// Custom error type for configuration and registry operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown service: {0}")]
    UnknownService(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

/// Result type for refcheck operations
pub type Result<T> = std::result::Result<T, Error>;

/// Underlying reason a batch was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "detail", rename_all = "snake_case")]
pub enum BatchFailureCause {
    /// The owning service confirmed the entity does not exist
    #[error("entity not found")]
    NotFound,

    /// Existence could not be confirmed either way
    #[error("{0}")]
    Unconfirmable(String),

    /// The request named an entity kind no validator exists for
    #[error("unknown validation kind: {0}")]
    UnknownKind(String),
}

/// Raised once per failing batch, naming the first failing entry only
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct BatchValidationError {
    pub message: String,
    pub failed_key: String,
    pub failed_kind: String,
    #[serde(rename = "originalError")]
    pub cause: BatchFailureCause,
}

impl BatchValidationError {
    pub fn new(
        failed_key: impl Into<String>,
        failed_kind: impl Into<String>,
        cause: BatchFailureCause,
    ) -> Self {
        let failed_key = failed_key.into();
        let failed_kind = failed_kind.into();
        let message = match &cause {
            BatchFailureCause::NotFound => {
                format!("{} '{}' was not found in its owning service", failed_kind, failed_key)
            }
            BatchFailureCause::Unconfirmable(reason) => format!(
                "could not confirm {} '{}': {}",
                failed_kind, failed_key, reason
            ),
            BatchFailureCause::UnknownKind(kind) => format!(
                "request '{}' uses unknown validation kind '{}'",
                failed_key, kind
            ),
        };

        Self {
            message,
            failed_key,
            failed_kind,
            cause,
        }
    }

    /// True for caller mistakes rather than data-integrity failures
    pub fn is_programmer_error(&self) -> bool {
        matches!(self.cause, BatchFailureCause::UnknownKind(_))
    }
}
