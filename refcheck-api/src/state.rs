//! Application state management

use std::sync::Arc;

use refcheck::{
    BatchCoordinator, EntityValidator, HealthAggregator, ModuleEndpoints, TimeoutBudgets,
};

use crate::error::ApiError;
use crate::observability::{MeteredLookup, ValidationMetrics};

/// Application state shared across handlers
pub struct AppState {
    /// Sequential batch validation over the sibling services
    pub coordinator: BatchCoordinator,
    /// Liveness fan-out over the same registry
    pub health: HealthAggregator,
    /// Effective timeout budgets
    pub budgets: TimeoutBudgets,
    /// Prometheus metrics
    pub metrics: Arc<ValidationMetrics>,
}

impl AppState {
    /// Wire the validator, coordinator and aggregator over one registry
    pub fn new(endpoints: ModuleEndpoints, budgets: TimeoutBudgets) -> Result<Self, ApiError> {
        let endpoints = Arc::new(endpoints);
        let metrics = Arc::new(ValidationMetrics::new()?);

        let validator = EntityValidator::new(endpoints.clone(), &budgets)?;
        let lookup = MeteredLookup::new(validator, metrics.clone());
        let coordinator = BatchCoordinator::new(Arc::new(lookup));
        let health = HealthAggregator::new(endpoints, &budgets)?;

        Ok(Self {
            coordinator,
            health,
            budgets,
            metrics,
        })
    }
}
