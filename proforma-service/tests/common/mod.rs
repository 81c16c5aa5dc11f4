//! Shared harness: the full router backed by the in-memory store, driven
//! through tower's oneshot without binding a socket.
#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use proforma_service::startup::{build_router, AppState};
use proforma_service::store::{MemoryStore, SharedStore};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;

pub struct TestApp {
    router: Router,
    pub store: SharedStore,
}

impl TestApp {
    pub fn new() -> Self {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let router = build_router(AppState {
            store: store.clone(),
        });
        Self { router, store }
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                builder.body(Body::from(json.to_string())).unwrap()
            }
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn get_text(&self, uri: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    /// Create a client and return its id.
    pub async fn seed_client(&self, name: &str) -> String {
        let (status, body) = self
            .request(
                "POST",
                "/api/clients",
                Some(json!({
                    "name": name,
                    "phone": "+229 97 00 00 00",
                    "email": "",
                    "address": "Cotonou"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }
}

/// Read a Decimal field out of a JSON body regardless of whether it was
/// serialized as a string or a bare number.
pub fn dec_field(body: &Value, key: &str) -> Decimal {
    match &body[key] {
        Value::String(s) => Decimal::from_str(s).unwrap(),
        other => serde_json::from_value(other.clone()).unwrap(),
    }
}
