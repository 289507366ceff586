//! Layered timeout budgets
//!
//! Each outer layer gets strictly more time than the layer it wraps so an
//! inner failure is reported before the outer caller gives up:
//! health-check < quick-operation < internal-service < client-facing < gateway.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use tracing::warn;

/// Named budget in the timeout hierarchy, innermost first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeoutTier {
    HealthCheck,
    QuickOperation,
    InternalService,
    ClientFacing,
    Gateway,
}

impl TimeoutTier {
    /// All tiers in hierarchy order
    pub const ALL: [TimeoutTier; 5] = [
        TimeoutTier::HealthCheck,
        TimeoutTier::QuickOperation,
        TimeoutTier::InternalService,
        TimeoutTier::ClientFacing,
        TimeoutTier::Gateway,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeoutTier::HealthCheck => "health-check",
            TimeoutTier::QuickOperation => "quick-operation",
            TimeoutTier::InternalService => "internal-service",
            TimeoutTier::ClientFacing => "client-facing",
            TimeoutTier::Gateway => "gateway",
        }
    }

    fn env_key(&self) -> &'static str {
        match self {
            TimeoutTier::HealthCheck => "HEALTH_CHECK_TIMEOUT_MS",
            TimeoutTier::QuickOperation => "QUICK_OPERATION_TIMEOUT_MS",
            TimeoutTier::InternalService => "INTERNAL_SERVICE_TIMEOUT_MS",
            TimeoutTier::ClientFacing => "CLIENT_FACING_TIMEOUT_MS",
            TimeoutTier::Gateway => "GATEWAY_TIMEOUT_MS",
        }
    }

    /// Map a free-text operation category to a tier.
    ///
    /// Unrecognized categories fall back to `InternalService`.
    pub fn classify(category: &str) -> Self {
        match category.trim().to_ascii_lowercase().as_str() {
            "health" | "health-check" | "ping" | "liveness" => TimeoutTier::HealthCheck,
            "auth" | "quick" | "cache" | "lookup" => TimeoutTier::QuickOperation,
            "internal" | "service" | "validation" => TimeoutTier::InternalService,
            "client" | "api" | "external" => TimeoutTier::ClientFacing,
            "upload" | "gateway" | "proxy" => TimeoutTier::Gateway,
            _ => TimeoutTier::InternalService,
        }
    }
}

impl fmt::Display for TimeoutTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Adjacent pair of tiers whose configured values break the ordering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyViolation {
    pub inner: TimeoutTier,
    pub inner_ms: u64,
    pub outer: TimeoutTier,
    pub outer_ms: u64,
}

impl fmt::Display for HierarchyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} timeout ({}ms) must be shorter than {} timeout ({}ms)",
            self.inner, self.inner_ms, self.outer, self.outer_ms
        )
    }
}

/// The five time budgets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutBudgets {
    pub health_check: Duration,
    pub quick_operation: Duration,
    pub internal_service: Duration,
    pub client_facing: Duration,
    pub gateway: Duration,
}

impl Default for TimeoutBudgets {
    fn default() -> Self {
        Self {
            health_check: Duration::from_secs(5),
            quick_operation: Duration::from_secs(10),
            internal_service: Duration::from_secs(25),
            client_facing: Duration::from_secs(30),
            gateway: Duration::from_secs(60),
        }
    }
}

impl TimeoutBudgets {
    /// Create budgets from `*_TIMEOUT_MS` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create budgets from any key/value source.
    ///
    /// Values are milliseconds; anything unparseable keeps the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut budgets = Self::default();

        for tier in TimeoutTier::ALL {
            let Some(raw) = lookup(tier.env_key()) else {
                continue;
            };
            match raw.trim().parse::<u64>() {
                Ok(ms) => budgets.set(tier, Duration::from_millis(ms)),
                Err(e) => warn!(
                    key = tier.env_key(),
                    value = %raw,
                    "ignoring invalid timeout override: {}", e
                ),
            }
        }

        budgets
    }

    /// Budget for a tier
    pub fn budget(&self, tier: TimeoutTier) -> Duration {
        match tier {
            TimeoutTier::HealthCheck => self.health_check,
            TimeoutTier::QuickOperation => self.quick_operation,
            TimeoutTier::InternalService => self.internal_service,
            TimeoutTier::ClientFacing => self.client_facing,
            TimeoutTier::Gateway => self.gateway,
        }
    }

    /// Budget for a free-text operation category
    pub fn budget_for(&self, category: &str) -> Duration {
        self.budget(TimeoutTier::classify(category))
    }

    /// Override a single tier
    pub fn set(&mut self, tier: TimeoutTier, value: Duration) {
        match tier {
            TimeoutTier::HealthCheck => self.health_check = value,
            TimeoutTier::QuickOperation => self.quick_operation = value,
            TimeoutTier::InternalService => self.internal_service = value,
            TimeoutTier::ClientFacing => self.client_facing = value,
            TimeoutTier::Gateway => self.gateway = value,
        }
    }

    /// Builder-style variant of [`TimeoutBudgets::set`]
    pub fn with(mut self, tier: TimeoutTier, value: Duration) -> Self {
        self.set(tier, value);
        self
    }

    /// Every adjacent pair that is not strictly increasing
    pub fn hierarchy_violations(&self) -> Vec<HierarchyViolation> {
        TimeoutTier::ALL
            .windows(2)
            .filter_map(|pair| {
                let (inner, outer) = (pair[0], pair[1]);
                let (inner_value, outer_value) = (self.budget(inner), self.budget(outer));
                (inner_value >= outer_value).then(|| HierarchyViolation {
                    inner,
                    inner_ms: inner_value.as_millis() as u64,
                    outer,
                    outer_ms: outer_value.as_millis() as u64,
                })
            })
            .collect()
    }

    /// Log each ordering violation as a warning.
    ///
    /// Misconfiguration is tolerated; returns whether the hierarchy holds.
    pub fn check_hierarchy(&self) -> bool {
        let violations = self.hierarchy_violations();
        for violation in &violations {
            warn!("timeout hierarchy violated: {}", violation);
        }
        violations.is_empty()
    }
}
