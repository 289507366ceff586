//! Shared fixtures: a fake sibling service served by axum on an ephemeral port

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use refcheck::{TimeoutBudgets, TimeoutTier};
use serde_json::json;

/// One validation request as seen by the fake service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub resource: String,
    pub id: String,
    pub tenant: Option<String>,
}

/// Fake sibling service.
///
/// Behaviour is chosen by id: `missing` → 404, `broken` → 500,
/// `slow` → answers after 2s, `garbled` → non-JSON body,
/// `legacy` → `{success, data}` envelope, `gone` → `{exists: false}`,
/// anything else exists.
#[derive(Clone, Default)]
pub struct Sibling {
    hits: Arc<Mutex<Vec<Hit>>>,
    unhealthy: bool,
}

impl Sibling {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unhealthy() -> Self {
        Self {
            unhealthy: true,
            ..Self::default()
        }
    }

    pub fn hits(&self) -> Vec<Hit> {
        self.hits.lock().unwrap().clone()
    }

    pub fn hit_ids(&self) -> Vec<String> {
        self.hits().into_iter().map(|hit| hit.id).collect()
    }

    pub async fn spawn(&self) -> String {
        let router = Router::new()
            .route("/health", get(health))
            .route("/api/:resource/:id/validate", get(validate))
            .with_state(self.clone());
        spawn_router(router).await
    }
}

async fn health(State(sibling): State<Sibling>) -> StatusCode {
    if sibling.unhealthy {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    }
}

async fn validate(
    State(sibling): State<Sibling>,
    Path((resource, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    // header names are case-insensitive on the receiving side
    let tenant = headers
        .get("X-Company-Id")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    sibling.hits.lock().unwrap().push(Hit {
        resource: resource.clone(),
        id: id.clone(),
        tenant: tenant.clone(),
    });

    match id.as_str() {
        "missing" => StatusCode::NOT_FOUND.into_response(),
        "broken" => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        "garbled" => (StatusCode::OK, "definitely not json").into_response(),
        "gone" => Json(json!({"exists": false})).into_response(),
        "legacy" => {
            Json(json!({"success": true, "data": {"id": id, "tenant": tenant}})).into_response()
        }
        "slow" => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(json!({"exists": true})).into_response()
        }
        _ => {
            let entity = resource.trim_end_matches('s').replace("companie", "company");
            let mut body = serde_json::Map::new();
            body.insert("exists".to_string(), json!(true));
            body.insert(entity, json!({"id": id, "tenant": tenant}));
            Json(serde_json::Value::Object(body)).into_response()
        }
    }
}

/// Serve a router on 127.0.0.1 with an ephemeral port
pub async fn spawn_router(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Address nothing is listening on
pub fn dead_address() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Short budgets that still respect the hierarchy
pub fn test_budgets() -> TimeoutBudgets {
    TimeoutBudgets::default()
        .with(TimeoutTier::HealthCheck, Duration::from_millis(300))
        .with(TimeoutTier::QuickOperation, Duration::from_millis(400))
        .with(TimeoutTier::InternalService, Duration::from_millis(500))
        .with(TimeoutTier::ClientFacing, Duration::from_millis(600))
        .with(TimeoutTier::Gateway, Duration::from_millis(700))
}
