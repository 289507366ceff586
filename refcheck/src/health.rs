//! Liveness fan-out across sibling services

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::config::{ModuleEndpoints, TimeoutBudgets};
use crate::error::Result;
use crate::http::build_client;

/// Outcome of one liveness probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceHealth {
    pub service: String,
    pub healthy: bool,
    pub latency_ms: u64,
    pub error: Option<String>,
}

/// Probes `GET {base}/health` on every registered service at once
pub struct HealthAggregator {
    client: Client,
    endpoints: Arc<ModuleEndpoints>,
    timeout: Duration,
}

impl HealthAggregator {
    /// Create an aggregator bounded by the health-check budget
    pub fn new(endpoints: Arc<ModuleEndpoints>, budgets: &TimeoutBudgets) -> Result<Self> {
        Ok(Self {
            client: build_client(budgets)?,
            endpoints,
            timeout: budgets.health_check,
        })
    }

    /// Healthy flag per service name
    pub async fn health_check(&self) -> BTreeMap<String, bool> {
        self.health_report()
            .await
            .into_iter()
            .map(|health| (health.service, health.healthy))
            .collect()
    }

    /// Detailed probe results, in service name order.
    ///
    /// Probes run concurrently with independent deadlines, so the whole
    /// report takes about one health-check budget at worst.
    #[instrument(skip(self), fields(services = self.endpoints.len()))]
    pub async fn health_report(&self) -> Vec<ServiceHealth> {
        let started = Instant::now();
        let probes = self
            .endpoints
            .iter()
            .map(|(service, base_url)| self.probe(service, base_url));
        let report = join_all(probes).await;

        let unhealthy = report.iter().filter(|health| !health.healthy).count();
        info!(
            unhealthy,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "health check cycle completed"
        );
        report
    }

    async fn probe(&self, service: &str, base_url: &str) -> ServiceHealth {
        let started = Instant::now();
        let url = format!("{}/health", base_url);

        let error = match self.client.get(&url).timeout(self.timeout).send().await {
            Ok(response) if response.status().is_success() => None,
            Ok(response) => Some(format!("HTTP {}", response.status().as_u16())),
            Err(e) if e.is_timeout() => {
                Some(format!("timed out after {}ms", self.timeout.as_millis()))
            }
            Err(e) => Some(e.to_string()),
        };
        let latency_ms = started.elapsed().as_millis() as u64;

        match &error {
            None => debug!(service, latency_ms, "service healthy"),
            Some(reason) => warn!(service, latency_ms, "service unhealthy: {}", reason),
        }

        ServiceHealth {
            service: service.to_string(),
            healthy: error.is_none(),
            latency_ms,
            error,
        }
    }
}
