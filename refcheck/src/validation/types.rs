//! Validation request and result types

use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::config::{
    AGENDA_SERVICE, AUTH_SERVICE, CUSTOMERS_SERVICE, PROFESSIONALS_SERVICE, SERVICES_SERVICE,
};

/// Entity kinds that can be referenced across services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Customer,
    Professional,
    Service,
    User,
    Company,
    Appointment,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Customer,
        EntityKind::Professional,
        EntityKind::Service,
        EntityKind::User,
        EntityKind::Company,
        EntityKind::Appointment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Customer => "customer",
            EntityKind::Professional => "professional",
            EntityKind::Service => "service",
            EntityKind::User => "user",
            EntityKind::Company => "company",
            EntityKind::Appointment => "appointment",
        }
    }

    /// Path segment under `/api/` on the owning service
    pub fn resource_path(&self) -> &'static str {
        match self {
            EntityKind::Customer => "customers",
            EntityKind::Professional => "professionals",
            EntityKind::Service => "services",
            EntityKind::User => "users",
            EntityKind::Company => "companies",
            EntityKind::Appointment => "appointments",
        }
    }

    /// Registry name of the service that owns this kind
    pub fn owning_service(&self) -> &'static str {
        match self {
            EntityKind::Customer => CUSTOMERS_SERVICE,
            EntityKind::Professional => PROFESSIONALS_SERVICE,
            EntityKind::Service => SERVICES_SERVICE,
            EntityKind::User | EntityKind::Company => AUTH_SERVICE,
            EntityKind::Appointment => AGENDA_SERVICE,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a kind string names no known entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKind(pub String);

impl fmt::Display for UnknownKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown validation kind: {}", self.0)
    }
}

impl std::error::Error for UnknownKind {}

impl FromStr for EntityKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// One existence check inside a batch.
///
/// `kind` keeps the caller's string so a kind arriving over the wire that
/// no validator handles is still representable and can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRequest {
    pub kind: String,
    pub id: String,
    pub tenant_id: String,
    /// Caller-chosen label correlating this request to its result
    pub key: String,
}

impl ValidationRequest {
    pub fn new(
        kind: EntityKind,
        id: impl Into<String>,
        tenant_id: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self::with_raw_kind(kind.as_str(), id, tenant_id, key)
    }

    pub fn with_raw_kind(
        kind: impl Into<String>,
        id: impl Into<String>,
        tenant_id: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
            tenant_id: tenant_id.into(),
            key: key.into(),
        }
    }

    pub fn entity_kind(&self) -> Result<EntityKind, UnknownKind> {
        self.kind.parse()
    }
}

/// Normalized outcome of one existence check.
///
/// `exists == false` with no `error` means confirmed absent; with an
/// `error` it means existence could not be confirmed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub exists: bool,
    pub error: Option<String>,
    pub data: Option<serde_json::Value>,
}

impl ValidationResult {
    pub fn found(data: Option<serde_json::Value>) -> Self {
        Self {
            exists: true,
            error: None,
            data,
        }
    }

    pub fn absent() -> Self {
        Self {
            exists: false,
            error: None,
            data: None,
        }
    }

    pub fn unconfirmable(error: impl Into<String>) -> Self {
        Self {
            exists: false,
            error: Some(error.into()),
            data: None,
        }
    }

    /// Confirmed absent or unconfirmable; both block dependent writes
    pub fn is_failure(&self) -> bool {
        !self.exists || self.error.is_some()
    }
}

/// Batch execution options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BatchOptions {
    /// Stop at the first failing entry
    pub fail_fast: bool,
    /// Treat absent or unconfirmable results as failures at all
    pub validate_references: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            fail_fast: true,
            validate_references: true,
        }
    }
}

impl BatchOptions {
    pub fn collect_all() -> Self {
        Self {
            fail_fast: false,
            ..Self::default()
        }
    }
}

/// Results keyed by request key, in first-insertion order.
///
/// A repeated key overwrites the earlier value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResults {
    entries: Vec<(String, ValidationResult)>,
}

impl BatchResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: String, result: ValidationResult) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = result,
            None => self.entries.push((key, result)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ValidationResult> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, result)| result)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ValidationResult)> {
        self.entries.iter().map(|(key, result)| (key.as_str(), result))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Whether every stored result confirmed existence
    pub fn all_exist(&self) -> bool {
        self.entries.iter().all(|(_, result)| !result.is_failure())
    }
}

impl Serialize for BatchResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, result) in &self.entries {
            map.serialize_entry(key, result)?;
        }
        map.end()
    }
}
