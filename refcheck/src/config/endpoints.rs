//! Endpoint registry for sibling services

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{Error, Result};
use crate::validation::EntityKind;

/// Service that owns users and companies
pub const AUTH_SERVICE: &str = "auth";
/// Service that owns customer records
pub const CUSTOMERS_SERVICE: &str = "customers";
/// Service that owns professionals
pub const PROFESSIONALS_SERVICE: &str = "professionals";
/// Service catalog
pub const SERVICES_SERVICE: &str = "services";
/// Scheduling service that owns appointments
pub const AGENDA_SERVICE: &str = "agenda";

/// (service name, environment key, default base URL)
const KNOWN_SERVICES: [(&str, &str, &str); 5] = [
    (AUTH_SERVICE, "AUTH_SERVICE_URL", "http://localhost:3001"),
    (CUSTOMERS_SERVICE, "CUSTOMERS_SERVICE_URL", "http://localhost:3002"),
    (PROFESSIONALS_SERVICE, "PROFESSIONALS_SERVICE_URL", "http://localhost:3003"),
    (SERVICES_SERVICE, "SERVICES_SERVICE_URL", "http://localhost:3004"),
    (AGENDA_SERVICE, "AGENDA_SERVICE_URL", "http://localhost:3005"),
];

/// Base address of each sibling service, keyed by service name.
///
/// Built once at startup and handed to the validator and the health
/// aggregator. The only way to change an entry is [`ModuleEndpoints::set`],
/// which needs exclusive access, so there is no request-scoped mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleEndpoints {
    urls: BTreeMap<String, String>,
}

impl Default for ModuleEndpoints {
    fn default() -> Self {
        Self::defaults()
    }
}

impl ModuleEndpoints {
    /// Registry with the built-in local development addresses
    pub fn defaults() -> Self {
        Self::from_lookup(|_| None)
    }

    /// Create the registry from `*_SERVICE_URL` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create the registry from any key/value source, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let urls = KNOWN_SERVICES
            .iter()
            .map(|(name, env_key, default)| {
                let url = lookup(env_key)
                    .filter(|value| !value.trim().is_empty())
                    .unwrap_or_else(|| default.to_string());
                debug!(service = name, url = %url, "registered service endpoint");
                (name.to_string(), normalize(&url))
            })
            .collect();

        Self { urls }
    }

    /// Empty registry, mostly useful for tests
    pub fn empty() -> Self {
        Self {
            urls: BTreeMap::new(),
        }
    }

    /// Builder-style variant of [`ModuleEndpoints::set`]
    pub fn with(mut self, service: impl Into<String>, base_url: impl AsRef<str>) -> Self {
        self.set(service, base_url);
        self
    }

    /// Point a service at a new base URL
    pub fn set(&mut self, service: impl Into<String>, base_url: impl AsRef<str>) {
        self.urls.insert(service.into(), normalize(base_url.as_ref()));
    }

    /// Base URL registered for a service
    pub fn get(&self, service: &str) -> Option<&str> {
        self.urls.get(service).map(String::as_str)
    }

    /// Base URL of the service that owns an entity kind
    pub fn base_url_for(&self, kind: EntityKind) -> Result<&str> {
        let service = kind.owning_service();
        self.get(service)
            .ok_or_else(|| Error::UnknownService(service.to_string()))
    }

    /// Registered services in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.urls.iter().map(|(name, url)| (name.as_str(), url.as_str()))
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

fn normalize(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
