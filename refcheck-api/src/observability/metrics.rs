//! Prometheus metrics for reference validation

use std::sync::Arc;

use async_trait::async_trait;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder,
};
use refcheck::{
    BatchResults, BatchValidationError, EntityKind, ReferenceLookup, ServiceHealth,
    ValidationResult,
};

/// Metrics collected by the API server
pub struct ValidationMetrics {
    pub registry: Registry,

    /// Single existence checks by kind and outcome
    pub reference_checks_total: IntCounterVec,

    /// Batches by outcome
    pub batches_total: IntCounterVec,
    pub batch_duration: Histogram,

    /// 1 when the last probe of a sibling service succeeded
    pub dependency_up: IntGaugeVec,
}

impl ValidationMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let reference_checks_total = IntCounterVec::new(
            Opts::new(
                "reference_checks_total",
                "Total number of cross-service existence checks",
            ),
            &["kind", "outcome"],
        )?;

        let batches_total = IntCounterVec::new(
            Opts::new("validation_batches_total", "Total number of validation batches"),
            &["outcome"],
        )?;

        let batch_duration = Histogram::with_opts(
            HistogramOpts::new(
                "validation_batch_duration_seconds",
                "Duration of validation batches in seconds",
            )
            .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        )?;

        let dependency_up = IntGaugeVec::new(
            Opts::new("dependency_up", "Whether a sibling service answered its health probe"),
            &["service"],
        )?;

        registry.register(Box::new(reference_checks_total.clone()))?;
        registry.register(Box::new(batches_total.clone()))?;
        registry.register(Box::new(batch_duration.clone()))?;
        registry.register(Box::new(dependency_up.clone()))?;

        Ok(Self {
            registry,
            reference_checks_total,
            batches_total,
            batch_duration,
            dependency_up,
        })
    }

    pub fn record_check(&self, kind: EntityKind, result: &ValidationResult) {
        let outcome = match (result.exists, &result.error) {
            (_, Some(_)) => "unconfirmable",
            (true, None) => "found",
            (false, None) => "absent",
        };
        self.reference_checks_total
            .with_label_values(&[kind.as_str(), outcome])
            .inc();
    }

    pub fn record_batch(&self, outcome: &Result<BatchResults, BatchValidationError>) {
        let label = match outcome {
            Ok(_) => "accepted",
            Err(err) if err.is_programmer_error() => "unknown_kind",
            Err(_) => "rejected",
        };
        self.batches_total.with_label_values(&[label]).inc();
    }

    pub fn record_health(&self, report: &[ServiceHealth]) {
        for health in report {
            self.dependency_up
                .with_label_values(&[health.service.as_str()])
                .set(i64::from(health.healthy));
        }
    }

    /// Text exposition of every registered metric
    pub fn render(&self) -> prometheus::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Lookup decorator counting every check it forwards
pub struct MeteredLookup<L> {
    inner: L,
    metrics: Arc<ValidationMetrics>,
}

impl<L> MeteredLookup<L> {
    pub fn new(inner: L, metrics: Arc<ValidationMetrics>) -> Self {
        Self { inner, metrics }
    }
}

#[async_trait]
impl<L: ReferenceLookup> ReferenceLookup for MeteredLookup<L> {
    async fn validate(&self, kind: EntityKind, id: &str, tenant_id: &str) -> ValidationResult {
        let result = self.inner.validate(kind, id, tenant_id).await;
        self.metrics.record_check(kind, &result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_labels() {
        let metrics = ValidationMetrics::new().unwrap();

        metrics.record_check(EntityKind::Customer, &ValidationResult::found(None));
        metrics.record_check(EntityKind::Customer, &ValidationResult::absent());
        metrics.record_check(EntityKind::Service, &ValidationResult::unconfirmable("timeout"));
        metrics.record_batch(&Ok(BatchResults::new()));

        let count = |kind: &str, outcome: &str| {
            metrics
                .reference_checks_total
                .with_label_values(&[kind, outcome])
                .get()
        };
        assert_eq!(count("customer", "found"), 1);
        assert_eq!(count("customer", "absent"), 1);
        assert_eq!(count("service", "unconfirmable"), 1);
        assert_eq!(metrics.batches_total.with_label_values(&["accepted"]).get(), 1);

        let text = metrics.render().unwrap();
        assert!(text.contains("reference_checks_total"));
        assert!(text.contains("validation_batches_total"));
    }
}
