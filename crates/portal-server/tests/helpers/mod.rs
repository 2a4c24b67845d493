//! Test helpers for portal server integration tests
//!
//! - Scripted mail transport and recording sleeper
//! - Notification stores, including one that always fails
//! - Gzip job builders
//! - A router wired exactly like production, minus the network

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use portal_common::compression::gzip_bytes;
use portal_common::types::{EmailItem, Notification, NotificationStatus};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use portal_server::api::{create_router, AppState};
use portal_server::config::{CorsConfig, DispatchConfig};
use portal_server::dispatch::{BulkDispatchService, EmailTransport, Sleeper, TransportError};
use portal_server::store::{
    InMemoryNotificationStore, NewNotification, NotificationFilter, NotificationStore,
    PersistenceError,
};

// ============================================================================
// Collaborators
// ============================================================================

/// Transport whose behaviour is scripted per recipient.
#[derive(Default)]
pub struct ScriptedTransport {
    /// Recipient -> number of leading failures before success
    flaky: Mutex<HashMap<String, u32>>,
    /// Recipients that never succeed
    dead: HashSet<String>,
    /// Every attempt, in call order
    attempts: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flaky(self, to: &str, failures: u32) -> Self {
        self.flaky.lock().unwrap().insert(to.to_string(), failures);
        self
    }

    pub fn dead(mut self, to: &str) -> Self {
        self.dead.insert(to.to_string());
        self
    }

    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn attempts_for(&self, to: &str) -> usize {
        self.attempts().iter().filter(|a| *a == to).count()
    }
}

#[async_trait]
impl EmailTransport for ScriptedTransport {
    async fn send(&self, item: &EmailItem) -> Result<(), TransportError> {
        self.attempts.lock().unwrap().push(item.to.clone());

        if self.dead.contains(&item.to) {
            return Err(TransportError::Rejected {
                status: 550,
                body: "mailbox unavailable".to_string(),
            });
        }

        let mut flaky = self.flaky.lock().unwrap();
        if let Some(remaining) = flaky.get_mut(&item.to) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(TransportError::Timeout);
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Records requested sleeps and returns at once.
#[derive(Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }

    pub fn count_of(&self, duration: Duration) -> usize {
        self.sleeps().iter().filter(|d| **d == duration).count()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

/// Store whose writes always fail.
pub struct FailingStore;

#[async_trait]
impl NotificationStore for FailingStore {
    async fn create(&self, _new: NewNotification) -> Result<Notification, PersistenceError> {
        Err(PersistenceError::Corrupt("write refused".to_string()))
    }

    async fn list(&self, _filter: &NotificationFilter) -> Result<Vec<Notification>, PersistenceError> {
        Ok(Vec::new())
    }

    async fn get(&self, _id: Uuid) -> Result<Option<Notification>, PersistenceError> {
        Ok(None)
    }

    async fn update_status(
        &self,
        id: Uuid,
        _status: NotificationStatus,
    ) -> Result<Notification, PersistenceError> {
        Err(PersistenceError::NotFound(id))
    }

    async fn delete(&self, id: Uuid) -> Result<(), PersistenceError> {
        Err(PersistenceError::NotFound(id))
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn email(to: &str) -> Value {
    json!({
        "to": to,
        "subject": "Asamblea general",
        "bodyText": "Le esperamos el viernes.",
        "bodyHtml": "<p>Le esperamos el viernes.</p>"
    })
}

pub fn recipients(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("socio{}@example.com", i)).collect()
}

pub fn job(recipients: &[String]) -> Value {
    json!({ "emails": recipients.iter().map(|r| email(r)).collect::<Vec<_>>() })
}

pub fn gzip_json(value: &Value) -> Vec<u8> {
    gzip_bytes(value.to_string().as_bytes()).unwrap()
}

// ============================================================================
// Test application
// ============================================================================

/// Production router around `service`, with CORS closed.
pub fn router(service: BulkDispatchService) -> Router {
    let cors = CorsConfig {
        allowed_origins: vec![],
        allow_credentials: false,
    };
    create_router(AppState::new(service), &cors)
}

/// `POST /api/v1/notifications/send-bulk` request carrying `payload` gzipped.
pub fn bulk_request(payload: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/notifications/send-bulk")
        .header("content-type", "application/octet-stream")
        .body(Body::from(gzip_json(payload)))
        .unwrap()
}

pub struct TestApp {
    pub router: Router,
    pub transport: Arc<ScriptedTransport>,
    pub sleeper: Arc<RecordingSleeper>,
    pub store: Arc<dyn NotificationStore>,
}

impl TestApp {
    pub fn new(transport: ScriptedTransport) -> Self {
        Self::build(transport, DispatchConfig::default(), Arc::new(InMemoryNotificationStore::new()))
    }

    pub fn build(
        transport: ScriptedTransport,
        config: DispatchConfig,
        store: Arc<dyn NotificationStore>,
    ) -> Self {
        let transport = Arc::new(transport);
        let sleeper = Arc::new(RecordingSleeper::default());
        let service = BulkDispatchService::from_config(
            &config,
            transport.clone(),
            store.clone(),
            sleeper.clone(),
        );
        Self {
            router: router(service),
            transport,
            sleeper,
            store,
        }
    }

    pub async fn notifications(&self) -> Vec<Notification> {
        self.store.list(&NotificationFilter::default()).await.unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&body).into_owned())
            })
        };
        (status, value)
    }

    pub async fn post_bytes(&self, uri: &str, bytes: Vec<u8>) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/octet-stream")
                .body(Body::from(bytes))
                .unwrap(),
        )
        .await
    }

    pub async fn send_bulk(&self, payload: &Value) -> (StatusCode, Value) {
        self.send(bulk_request(payload)).await
    }

    pub async fn json(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }
}
