//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health               - Liveness
//! GET    /health/ready         - Readiness (database reachable)
//!
//! # Account (public except logout)
//! POST   /register             - Create account, returns bearer token
//! POST   /login                - Email + password, returns bearer token
//! POST   /logout               - Acknowledge logout (bearer)
//! POST   /forget-password      - Issue reset token if the email exists
//! POST   /reset-password       - Consume reset token, set new password
//!
//! # Directory (bearer)
//! POST   /user                 - Create account
//! GET    /users                - List accounts (?nome&page&pageSize)
//! GET    /user/{id}            - Get account
//! DELETE /user/{id}            - Delete account
//! ```

pub mod auth;
pub mod health;
pub mod users;

use axum::{
    Router,
    http::{Request, Response},
    routing::{get, post},
};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Account and directory routes, without state.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/forget-password", post(auth::forget_password))
        .route("/reset-password", post(auth::reset_password))
        .route("/user", post(users::create_user))
        .route("/users", get(users::list_users))
        .route("/user/{id}", get(users::get_user).delete(users::delete_user))
}

/// The full application: health probes, routes, tracing and request ids.
///
/// Sentry layers are added by the binary so tests can drive this directly.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(routes())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(|response: &Response<_>, latency: std::time::Duration, span: &Span| {
                    span.record("status", response.status().as_u16());
                    span.record(
                        "latency_ms",
                        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                    );
                    DefaultOnResponse::default().on_response(response, latency, span);
                }),
        )
        .with_state(state)
}
