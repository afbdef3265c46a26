//! HTTP middleware stack for the API.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//!
//! Bearer authentication is an extractor, applied per handler.

pub mod auth;
pub mod request_id;

pub use auth::RequireAuth;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
