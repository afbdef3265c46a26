//! Wire types exchanged with the HTTP API.
//!
//! Every endpoint answers with an [`ApiResponse`] envelope. Field names are
//! camelCase on the wire.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{PageRequest, UserId};

// =============================================================================
// Response Types
// =============================================================================

/// Uniform response envelope.
///
/// `data` is present on success, `errors` lists specific reasons on failure.
/// Both are serialized as `null` when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
    pub errors: Option<Vec<String>>,
}

impl<T> ApiResponse<T> {
    /// Successful response carrying `data`.
    #[must_use]
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            errors: None,
        }
    }

    /// Failed response with an optional list of reasons.
    #[must_use]
    pub fn failure(message: impl Into<String>, errors: Option<Vec<String>>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            errors,
        }
    }
}

/// Returned by register and login.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub email: String,
    pub name: String,
}

impl fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthResponse")
            .field("token", &"[REDACTED]")
            .field("email", &self.email)
            .field("name", &self.name)
            .finish()
    }
}

/// Public view of an account. Never carries the password verifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// One page of a listing plus the totals needed to navigate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u64,
}

impl<T> PaginatedResponse<T> {
    /// Assemble a page, deriving `total_pages` from the request's page size.
    #[must_use]
    pub const fn new(items: Vec<T>, total_count: u64, request: PageRequest) -> Self {
        Self {
            items,
            total_count,
            page: request.page(),
            page_size: request.page_size(),
            total_pages: request.total_pages(total_count),
        }
    }
}

// =============================================================================
// Request Types
// =============================================================================

/// Self-service registration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Email + password login.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Ask for a password reset token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgetPasswordRequest {
    pub email: String,
}

/// Consume a reset token and set a new password.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: String,
    pub token: String,
    pub new_password: String,
}

/// Administrator-driven account creation.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Debug for ResetPasswordRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResetPasswordRequest")
            .field("email", &self.email)
            .field("token", &"[REDACTED]")
            .field("new_password", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Debug for CreateUserRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateUserRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl From<RegisterRequest> for CreateUserRequest {
    fn from(request: RegisterRequest) -> Self {
        Self {
            name: request.name,
            email: request.email,
            password: request.password,
        }
    }
}
