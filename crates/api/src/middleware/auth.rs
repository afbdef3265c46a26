//! Bearer token extractor.
//!
//! Protected handlers take [`RequireAuth`]; a missing, malformed, expired or
//! forged token is rejected with a uniform 401 envelope.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::debug;

use crate::error::{AppError, set_sentry_user};
use crate::models::CurrentUser;
use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Extractor that requires a valid bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireAuth(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .ok_or(AppError::Unauthorized)?;

        let claims = state.tokens().validate(token).map_err(|e| {
            debug!(error = %e, "Bearer token rejected");
            AppError::Unauthorized
        })?;
        let user = claims.current_user().map_err(|_| AppError::Unauthorized)?;

        set_sentry_user(user.id, Some(&user.email));
        Ok(Self(user))
    }
}

/// Token part of an `Authorization: Bearer <token>` header value.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_at_checked(BEARER_PREFIX.len())?;
    if !scheme.eq_ignore_ascii_case(BEARER_PREFIX) {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
