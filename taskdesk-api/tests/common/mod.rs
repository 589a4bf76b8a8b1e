//! Common test utilities for integration tests
//!
//! This module provides shared infrastructure for integration tests:
//! - An app wired to in-memory stores (no database needed)
//! - Cheap password hashing so tests stay fast
//! - Request helpers that return status and parsed JSON

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use taskdesk_api::app::{build_router, AppState};
use taskdesk_api::config::Config;
use taskdesk_shared::auth::jwt::TokenService;
use taskdesk_shared::auth::password::HashCost;
use taskdesk_shared::store::memory::{InMemoryTaskStore, InMemoryUserStore};
use taskdesk_shared::store::{TaskStore, UserStore};
use tower::Service as _;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test-secret-key-at-least-32-bytes-long";

/// Test context containing all necessary resources
pub struct TestContext {
    pub app: axum::Router,
    pub users: Arc<InMemoryUserStore>,
    pub tasks: Arc<InMemoryTaskStore>,
    pub tokens: TokenService,
}

/// A registered user as seen by the client
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub token: String,
}

impl TestUser {
    /// Returns authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Builds a config from fixed test values plus overrides
pub fn test_config(overrides: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("DATABASE_URL".to_string(), "postgresql://unused/test".to_string()),
        ("JWT_SECRET".to_string(), TEST_JWT_SECRET.to_string()),
    ]);
    for (key, value) in overrides {
        vars.insert(key.to_string(), value.to_string());
    }

    Config::from_lookup(|key| vars.get(key).cloned()).expect("valid test config")
}

impl TestContext {
    /// Creates a new test context with empty stores in development mode
    pub fn new() -> Self {
        Self::with_config(test_config(&[]))
    }

    /// Creates a test context with a specific configuration
    pub fn with_config(config: Config) -> Self {
        let users = Arc::new(InMemoryUserStore::new());
        let tasks = Arc::new(InMemoryTaskStore::new());
        let app = app_with_stores(users.clone(), tasks.clone(), config);

        TestContext {
            app,
            users,
            tasks,
            tokens: TokenService::new(TEST_JWT_SECRET),
        }
    }

    /// Sends a request and returns status and JSON body (`Null` if not JSON)
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        auth: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, bytes) = self.send_raw(method, uri, auth, body.map(|b| b.to_string())).await;
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    /// Sends a request with a raw body and returns status and body bytes
    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        auth: Option<&str>,
        body: Option<String>,
    ) -> (StatusCode, Vec<u8>) {
        send_to(&self.app, method, uri, auth, body).await
    }

    /// Registers a user and returns the client-side view of it
    pub async fn register(&self, email: &str, password: &str) -> TestUser {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/auth/register",
                None,
                Some(serde_json::json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

        TestUser {
            id: body["id"].as_str().unwrap().parse().unwrap(),
            email: body["email"].as_str().unwrap().to_string(),
            token: body["token"].as_str().unwrap().to_string(),
        }
    }

    /// Creates a task for a user and returns its JSON
    pub async fn create_task(&self, user: &TestUser, body: Value) -> Value {
        let (status, task) = self
            .send(Method::POST, "/api/tasks", Some(&user.auth_header()), Some(body))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {}", task);
        task
    }
}

/// Builds the router over arbitrary stores
pub fn app_with_stores(
    users: Arc<dyn UserStore>,
    tasks: Arc<dyn TaskStore>,
    config: Config,
) -> axum::Router {
    build_router(AppState::new(users, tasks, config, HashCost::minimal()))
}

/// Sends one request through a router
pub async fn send_to(
    app: &axum::Router,
    method: Method,
    uri: &str,
    auth: Option<&str>,
    body: Option<String>,
) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().call(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();

    (status, bytes)
}
