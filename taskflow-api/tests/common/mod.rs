//! Common test utilities for integration tests
//!
//! Builds the full router over an in-memory store and offers helpers to
//! register users and send JSON requests through it.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use taskflow_api::app::{build_router, AppState};
use taskflow_api::config::Config;
use taskflow_shared::store::InMemoryStore;
use tower::Service as _;

pub const TEST_SECRET: &str = "integration-test-secret";

/// Test context containing the router and its configuration
pub struct TestContext {
    pub app: axum::Router,
    pub config: Config,
}

/// A registered user and their session token
pub struct TestUser {
    pub id: i64,
    pub token: String,
}

impl TestContext {
    /// Creates a router over a fresh, empty store
    pub fn new() -> Self {
        let config = Config::from_vars(|name| match name {
            "JWT_SECRET" => Some(TEST_SECRET.to_string()),
            "STORE" => Some("memory".to_string()),
            _ => None,
        })
        .unwrap();

        let state = AppState::new(Arc::new(InMemoryStore::new()), config.clone());
        let app = build_router(state);

        TestContext { app, config }
    }

    /// Sends a request and returns status and parsed JSON body
    ///
    /// An empty body parses as `Value::Null`.
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", token);
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, json)
    }

    /// Registers a user through the API and returns its ID and token
    pub async fn register(&self, email: &str) -> TestUser {
        let (status, body) = self
            .send(
                "POST",
                "/users/register",
                None,
                Some(serde_json::json!({
                    "first_name": "John",
                    "last_name": "Doe",
                    "email": email,
                    "password": "pw",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

        TestUser {
            id: body["user_id"].as_i64().unwrap(),
            token: body["token"].as_str().unwrap().to_string(),
        }
    }

    /// Creates a task through the API and returns its JSON
    pub async fn create_task(&self, user: &TestUser, body: Value) -> Value {
        let (status, task) = self.send("POST", "/tasks", Some(&user.token), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {}", task);
        task
    }
}
