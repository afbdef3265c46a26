//! Unified error handling for the API.
//!
//! Every failure is rendered as the standard [`ApiResponse`] envelope with
//! `success: false`. Internal errors are logged and captured to Sentry but
//! only ever reported to the caller as "Internal server error".

use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use bolao_core::{ApiResponse, UserId};

use crate::services::AuthError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Account or credential operation failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Request body could not be read as JSON of the right shape.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Missing or invalid bearer token.
    #[error("Unauthorized")]
    Unauthorized,
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl AppError {
    const fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Auth(AuthError::Repository(_) | AuthError::PasswordHash | AuthError::Token(_))
        )
    }

    fn status(&self) -> StatusCode {
        if self.is_internal() {
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
        match self {
            Self::Auth(AuthError::UserNotFound) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Caller-facing message and reasons.
    fn envelope(self) -> ApiResponse<()> {
        let reasons = |items: &[&str]| -> Option<Vec<String>> {
            Some(items.iter().map(|s| (*s).to_string()).collect())
        };

        match self {
            Self::Auth(AuthError::Validation(errors)) => {
                ApiResponse::failure("Validation failed", Some(errors))
            }
            Self::Auth(AuthError::UserAlreadyExists) => {
                ApiResponse::failure("Email already in use", reasons(&["Email already registered"]))
            }
            Self::Auth(AuthError::InvalidCredentials) => ApiResponse::failure(
                "Invalid credentials",
                reasons(&["Email or password incorrect"]),
            ),
            Self::Auth(AuthError::InvalidResetToken) => ApiResponse::failure(
                "Could not reset password",
                reasons(&["Invalid or expired reset token"]),
            ),
            Self::Auth(AuthError::UserNotFound) => {
                ApiResponse::failure("User not found", reasons(&["User does not exist"]))
            }
            Self::BadRequest(detail) => ApiResponse::failure("Invalid request", Some(vec![detail])),
            Self::Unauthorized => ApiResponse::failure("Unauthorized", None),
            Self::Auth(AuthError::Repository(_) | AuthError::PasswordHash | AuthError::Token(_)) => {
                ApiResponse::failure("Internal server error", None)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if self.is_internal() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "API request error"
            );
        }

        let status = self.status();
        (status, Json(self.envelope())).into_response()
    }
}

/// JSON extractor whose rejection is an [`AppError`] envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl<T: Serialize> IntoResponse for AppJson<T> {
    fn into_response(self) -> Response {
        Json(self.0).into_response()
    }
}

/// Query-string extractor whose rejection is an [`AppError`] envelope.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

/// Set the Sentry user context from an account.
pub fn set_sentry_user(user_id: UserId, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
