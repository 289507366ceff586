//! Tests for single existence checks against a live fake service

mod common;

use std::sync::Arc;
use std::time::Instant;

use common::{dead_address, test_budgets, Sibling};
use refcheck::config::{AUTH_SERVICE, CUSTOMERS_SERVICE, SERVICES_SERVICE};
use refcheck::{EntityKind, EntityValidator, ModuleEndpoints, ReferenceLookup};
use serde_json::json;

async fn validator_for(sibling: &Sibling) -> EntityValidator {
    let base = sibling.spawn().await;
    let endpoints = EntityKind::ALL
        .iter()
        .fold(ModuleEndpoints::empty(), |endpoints, kind| {
            endpoints.with(kind.owning_service(), &base)
        });
    EntityValidator::new(Arc::new(endpoints), &test_budgets()).unwrap()
}

#[tokio::test]
async fn test_existing_entity_returns_payload() {
    let sibling = Sibling::new();
    let validator = validator_for(&sibling).await;

    let result = validator.validate_customer("c-42", "tenant-7").await;

    assert!(result.exists);
    assert!(result.error.is_none());
    assert_eq!(result.data, Some(json!({"id": "c-42", "tenant": "tenant-7"})));
}

#[tokio::test]
async fn test_tenant_header_and_path_per_kind() {
    let sibling = Sibling::new();
    let validator = validator_for(&sibling).await;

    for kind in EntityKind::ALL {
        let result = validator.validate(kind, "id-1", "tenant-x").await;
        assert!(result.exists, "{} should exist", kind);
    }

    let hits = sibling.hits();
    let resources: Vec<&str> = hits.iter().map(|hit| hit.resource.as_str()).collect();
    assert_eq!(
        resources,
        vec!["customers", "professionals", "services", "users", "companies", "appointments"]
    );
    assert!(hits.iter().all(|hit| hit.tenant.as_deref() == Some("tenant-x")));
}

#[tokio::test]
async fn test_not_found_is_confirmed_absent() {
    let sibling = Sibling::new();
    let validator = validator_for(&sibling).await;

    let result = validator.validate_professional("missing", "t").await;
    assert!(!result.exists);
    assert!(result.error.is_none());

    let result = validator.validate_service("gone", "t").await;
    assert!(!result.exists);
    assert!(result.error.is_none());
}

#[tokio::test]
async fn test_server_error_is_unconfirmable() {
    let sibling = Sibling::new();
    let validator = validator_for(&sibling).await;

    let result = validator.validate_appointment("broken", "t").await;

    assert!(!result.exists);
    assert_eq!(
        result.error.as_deref(),
        Some("agenda service responded with HTTP 500")
    );
}

#[tokio::test]
async fn test_garbled_body_is_unconfirmable() {
    let sibling = Sibling::new();
    let validator = validator_for(&sibling).await;

    let result = validator.validate_user("garbled", "t").await;

    assert!(!result.exists);
    assert!(result
        .error
        .unwrap()
        .starts_with("malformed validation response"));
}

#[tokio::test]
async fn test_timeout_is_unconfirmable_within_budget() {
    let sibling = Sibling::new();
    let validator = validator_for(&sibling).await;

    let started = Instant::now();
    let result = validator.validate_customer("slow", "t").await;

    assert!(started.elapsed() < test_budgets().internal_service * 3);
    assert!(!result.exists);
    assert_eq!(
        result.error.as_deref(),
        Some("customer validation timed out after 500ms")
    );
}

#[tokio::test]
async fn test_connection_refused_is_unconfirmable() {
    let endpoints = ModuleEndpoints::empty().with(SERVICES_SERVICE, dead_address());
    let validator = EntityValidator::new(Arc::new(endpoints), &test_budgets()).unwrap();

    let result = validator.validate_service("s-1", "t").await;

    assert!(!result.exists);
    assert!(result.error.unwrap().contains("services service"));
}

#[tokio::test]
async fn test_company_legacy_envelope() {
    let sibling = Sibling::new();
    let validator = validator_for(&sibling).await;

    let legacy = validator.validate_company("legacy", "tenant-3").await;
    let modern = validator.validate_company("co-1", "tenant-3").await;

    assert!(legacy.exists);
    assert!(modern.exists);
    assert_eq!(legacy.data, Some(json!({"id": "legacy", "tenant": "tenant-3"})));
    assert_eq!(modern.data, Some(json!({"id": "co-1", "tenant": "tenant-3"})));
}

#[tokio::test]
async fn test_registry_is_consulted_per_kind() {
    let customers = Sibling::new();
    let auth = Sibling::new();
    let endpoints = ModuleEndpoints::empty()
        .with(CUSTOMERS_SERVICE, customers.spawn().await)
        .with(AUTH_SERVICE, auth.spawn().await);
    let validator = EntityValidator::new(Arc::new(endpoints), &test_budgets()).unwrap();

    assert!(validator.validate_customer("c-1", "t").await.exists);
    assert!(validator.validate_user("u-1", "t").await.exists);
    assert!(validator.validate_company("co-1", "t").await.exists);

    assert_eq!(customers.hit_ids(), vec!["c-1"]);
    assert_eq!(auth.hit_ids(), vec!["u-1", "co-1"]);
}
