//! Per-entity existence checks against the owning service

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use super::types::{EntityKind, ValidationResult};
use crate::config::{ModuleEndpoints, TimeoutBudgets};
use crate::error::{Error, Result};
use crate::http::build_client;

/// Header carrying the tenant on every outbound validation call
pub const TENANT_HEADER: &str = "x-company-id";

/// Existence lookup the batch coordinator dispatches to.
///
/// Implementations never fail: every outcome, including transport errors,
/// is folded into the returned [`ValidationResult`].
#[async_trait]
pub trait ReferenceLookup: Send + Sync {
    async fn validate(&self, kind: EntityKind, id: &str, tenant_id: &str) -> ValidationResult;
}

/// HTTP validator issuing `GET {base}/api/{resource}/{id}/validate`
pub struct EntityValidator {
    client: Client,
    endpoints: Arc<ModuleEndpoints>,
    timeout: Duration,
}

impl EntityValidator {
    /// Create a validator bounded by the internal-service budget
    pub fn new(endpoints: Arc<ModuleEndpoints>, budgets: &TimeoutBudgets) -> Result<Self> {
        Ok(Self {
            client: build_client(budgets)?,
            endpoints,
            timeout: budgets.internal_service,
        })
    }

    pub async fn validate_customer(&self, id: &str, tenant_id: &str) -> ValidationResult {
        self.check(EntityKind::Customer, id, tenant_id).await
    }

    pub async fn validate_professional(&self, id: &str, tenant_id: &str) -> ValidationResult {
        self.check(EntityKind::Professional, id, tenant_id).await
    }

    pub async fn validate_service(&self, id: &str, tenant_id: &str) -> ValidationResult {
        self.check(EntityKind::Service, id, tenant_id).await
    }

    pub async fn validate_user(&self, id: &str, tenant_id: &str) -> ValidationResult {
        self.check(EntityKind::User, id, tenant_id).await
    }

    /// Accepts both `{exists, company}` and the legacy `{success, data}` envelope
    pub async fn validate_company(&self, id: &str, tenant_id: &str) -> ValidationResult {
        self.check(EntityKind::Company, id, tenant_id).await
    }

    pub async fn validate_appointment(&self, id: &str, tenant_id: &str) -> ValidationResult {
        self.check(EntityKind::Appointment, id, tenant_id).await
    }

    fn validate_url(&self, kind: EntityKind, id: &str) -> Result<Url> {
        let base = self.endpoints.base_url_for(kind)?;
        let mut url =
            Url::parse(base).map_err(|e| Error::InvalidUrl(format!("{}: {}", base, e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::InvalidUrl(format!("{}: cannot be a base URL", base)))?
            .pop_if_empty()
            .extend(["api", kind.resource_path(), id, "validate"]);
        Ok(url)
    }

    #[instrument(skip(self), fields(service = kind.owning_service()))]
    async fn check(&self, kind: EntityKind, id: &str, tenant_id: &str) -> ValidationResult {
        let url = match self.validate_url(kind, id) {
            Ok(url) => url,
            Err(e) => {
                warn!("cannot build validation URL: {}", e);
                return ValidationResult::unconfirmable(e.to_string());
            }
        };

        debug!(%url, "checking reference");

        let response = match self
            .client
            .get(url)
            .header(TENANT_HEADER, tenant_id)
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                let message = describe_transport_error(kind, &e, self.timeout);
                warn!("{}", message);
                return ValidationResult::unconfirmable(message);
            }
        };

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("reference confirmed absent");
            return ValidationResult::absent();
        }
        if !status.is_success() {
            let message = format!(
                "{} service responded with HTTP {}",
                kind.owning_service(),
                status.as_u16()
            );
            warn!("{}", message);
            return ValidationResult::unconfirmable(message);
        }

        match response.json::<Value>().await {
            Ok(body) => interpret_body(kind, body),
            Err(e) => {
                warn!("unreadable validation response: {}", e);
                ValidationResult::unconfirmable(format!("malformed validation response: {}", e))
            }
        }
    }
}

#[async_trait]
impl ReferenceLookup for EntityValidator {
    async fn validate(&self, kind: EntityKind, id: &str, tenant_id: &str) -> ValidationResult {
        match kind {
            EntityKind::Customer => self.validate_customer(id, tenant_id).await,
            EntityKind::Professional => self.validate_professional(id, tenant_id).await,
            EntityKind::Service => self.validate_service(id, tenant_id).await,
            EntityKind::User => self.validate_user(id, tenant_id).await,
            EntityKind::Company => self.validate_company(id, tenant_id).await,
            EntityKind::Appointment => self.validate_appointment(id, tenant_id).await,
        }
    }
}

fn describe_transport_error(kind: EntityKind, error: &reqwest::Error, timeout: Duration) -> String {
    let service = kind.owning_service();
    if error.is_timeout() {
        format!(
            "{} validation timed out after {}ms",
            kind,
            timeout.as_millis()
        )
    } else if error.is_connect() {
        format!("could not connect to {} service: {}", service, error)
    } else {
        format!("request to {} service failed: {}", service, error)
    }
}

/// Normalize a 2xx validation body into a result
pub(crate) fn interpret_body(kind: EntityKind, body: Value) -> ValidationResult {
    let Value::Object(mut fields) = body else {
        return ValidationResult::unconfirmable(
            "malformed validation response: expected a JSON object",
        );
    };

    if kind == EntityKind::Company && !fields.contains_key("exists") {
        if let Some(success) = fields.get("success").and_then(Value::as_bool) {
            return if success {
                ValidationResult::found(take_object(&mut fields, "data"))
            } else {
                ValidationResult::absent()
            };
        }
    }

    match fields.get("exists").and_then(Value::as_bool) {
        Some(true) => ValidationResult::found(take_object(&mut fields, kind.as_str())),
        Some(false) => ValidationResult::absent(),
        None => ValidationResult::unconfirmable(
            "malformed validation response: missing boolean `exists`",
        ),
    }
}

fn take_object(fields: &mut Map<String, Value>, name: &str) -> Option<Value> {
    fields.remove(name).filter(|value| !value.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_exists_envelope() {
        let result = interpret_body(
            EntityKind::Customer,
            json!({"exists": true, "customer": {"id": "c-1", "name": "Ana"}}),
        );
        assert_eq!(result, ValidationResult::found(Some(json!({"id": "c-1", "name": "Ana"}))));

        let result = interpret_body(EntityKind::Customer, json!({"exists": false}));
        assert_eq!(result, ValidationResult::absent());
    }

    #[test]
    fn test_company_shapes_normalize_identically() {
        let company = json!({"id": "co-9", "name": "Acme"});

        let modern = interpret_body(
            EntityKind::Company,
            json!({"exists": true, "company": company}),
        );
        let legacy = interpret_body(EntityKind::Company, json!({"success": true, "data": company}));
        assert_eq!(modern, legacy);
        assert!(modern.exists);

        let modern = interpret_body(EntityKind::Company, json!({"exists": false}));
        let legacy = interpret_body(EntityKind::Company, json!({"success": false}));
        assert_eq!(modern, legacy);
        assert_eq!(modern, ValidationResult::absent());
    }

    #[test]
    fn test_legacy_envelope_is_company_only() {
        let result = interpret_body(EntityKind::User, json!({"success": true, "data": {}}));

        assert!(!result.exists);
        assert!(result.error.is_some());
    }

    #[test]
    fn test_malformed_bodies_are_unconfirmable() {
        for body in [json!([1, 2]), json!({"exists": "yes"}), json!("ok"), json!({})] {
            let result = interpret_body(EntityKind::Service, body);
            assert!(!result.exists);
            assert!(result.error.unwrap().starts_with("malformed validation response"));
        }
    }

    #[test]
    fn test_validate_url_escapes_id() {
        let endpoints =
            ModuleEndpoints::defaults().with("customers", "http://customers:8080/base/");
        let validator =
            EntityValidator::new(Arc::new(endpoints), &TimeoutBudgets::default()).unwrap();

        let url = validator.validate_url(EntityKind::Customer, "a/b c").unwrap();
        assert_eq!(url.as_str(), "http://customers:8080/base/api/customers/a%2Fb%20c/validate");

        let url = validator.validate_url(EntityKind::Appointment, "42").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3005/api/appointments/42/validate");
    }

    #[tokio::test]
    async fn test_unregistered_service_is_unconfirmable() {
        let endpoints = Arc::new(ModuleEndpoints::empty());
        let validator = EntityValidator::new(endpoints, &TimeoutBudgets::default()).unwrap();

        let result = validator.validate_professional("p-1", "tenant-1").await;

        assert!(!result.exists);
        assert_eq!(result.error.as_deref(), Some("Unknown service: professionals"));
    }
}
