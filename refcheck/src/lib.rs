//! Refcheck - cross-service reference validation
//!
//! Services that share no database confirm, over HTTP, that the ids they
//! are about to store exist in the service that owns them. This library
//! provides the endpoint registry, the layered timeout policy, per-entity
//! validators, the fail-fast batch coordinator and a health fan-out.

pub mod config;
pub mod error;
pub mod health;
pub mod validation;

mod http;

// Re-export commonly used types for convenience
pub use config::{ModuleEndpoints, TimeoutBudgets, TimeoutTier};
pub use error::{BatchFailureCause, BatchValidationError, Error, Result};
pub use health::{HealthAggregator, ServiceHealth};
pub use validation::{
    BatchCoordinator, BatchOptions, BatchResults, EntityKind, EntityValidator, ReferenceLookup,
    ValidationRequest, ValidationResult, TENANT_HEADER,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
