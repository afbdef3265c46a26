//! Integration test harness for Bolao.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests (in-memory SQLite, no server needed)
//! cargo test -p bolao-integration-tests
//!
//! # Live-server tests against a running instance
//! BOLAO_BASE_URL=http://localhost:5000 cargo test -p bolao-integration-tests -- --ignored
//! ```
//!
//! [`TestApp`] builds the full router over a private in-memory database with
//! cheap Argon2 parameters and a notifier that records reset tokens.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::{Arc, Mutex};

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use chrono::Duration;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use bolao_api::config::{ApiConfig, PasswordHashConfig, TokenConfig};
use bolao_api::models::User;
use bolao_api::routes;
use bolao_api::services::ResetNotifier;
use bolao_api::state::AppState;

/// Signing secret used by every in-process test.
pub const TEST_JWT_SECRET: &str = "kF8#vQ2!mZ7@rW4$tY9^bN3&hJ6*pL1x";

/// A password that satisfies the default policy.
pub const STRONG_PASSWORD: &str = "Secret#123";

/// Base URL for live-server tests (configurable via environment).
#[must_use]
pub fn live_base_url() -> String {
    std::env::var("BOLAO_BASE_URL").unwrap_or_else(|_| "http://localhost:5000".to_string())
}

/// Configuration for an in-memory test instance.
#[must_use]
pub fn test_config() -> ApiConfig {
    ApiConfig {
        database_url: SecretString::from("sqlite::memory:"),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        token: TokenConfig {
            secret: SecretString::from(TEST_JWT_SECRET),
            issuer: "your-api".to_string(),
            audience: "your-api-users".to_string(),
            ttl: Duration::hours(24),
        },
        reset_token_ttl: Duration::minutes(60),
        password_hashing: PasswordHashConfig {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        },
        admin_seed: None,
        log_json: false,
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// Notifier that keeps every issued reset token.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    tokens: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    /// Most recent token issued for `email`.
    #[must_use]
    pub fn last_token_for(&self, email: &str) -> Option<String> {
        self.tokens
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(to, _)| to.eq_ignore_ascii_case(email))
            .map(|(_, token)| token.clone())
    }

    /// Number of tokens issued so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.tokens.lock().unwrap().len()
    }
}

impl ResetNotifier for RecordingNotifier {
    fn password_reset_requested(&self, user: &User, token: &str) {
        self.tokens
            .lock()
            .unwrap()
            .push((user.email.to_string(), token.to_string()));
    }
}

/// A decoded response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// JSON body, or the raw text as a JSON string if it isn't JSON.
    pub body: Value,
}

/// The full application over a private in-memory database.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    /// Build a fresh instance.
    pub async fn spawn() -> Self {
        let pool = bolao_api::db::create_in_memory_pool().await.unwrap();
        let notifier = Arc::new(RecordingNotifier::default());
        let state = AppState::with_notifier(test_config(), pool, notifier.clone()).unwrap();
        Self {
            router: routes::app(state.clone()),
            state,
            notifier,
        }
    }

    /// Send one request through the router.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send(request).await
    }

    /// Send a prepared request through the router.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// `POST` a JSON body without a token.
    pub async fn post(&self, uri: &str, body: &Value) -> TestResponse {
        self.request(Method::POST, uri, None, Some(body)).await
    }

    /// `GET` with a bearer token.
    pub async fn get_authed(&self, uri: &str, token: &str) -> TestResponse {
        self.request(Method::GET, uri, Some(token), None).await
    }

    /// Register an account and return its bearer token.
    pub async fn register(&self, name: &str, email: &str) -> String {
        let response = self
            .post(
                "/register",
                &serde_json::json!({
                    "name": name,
                    "email": email,
                    "password": STRONG_PASSWORD,
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.body["data"]["token"].as_str().unwrap().to_string()
    }
}
