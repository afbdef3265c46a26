//! Account service error types.

use thiserror::Error;

use crate::db::RepositoryError;

use super::token::TokenError;

/// Errors that can occur during account and credential operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Field-level validation failures, all reported together.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// An account with this email already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Reset token unknown, expired, already used, or for another account.
    #[error("invalid or expired reset token")]
    InvalidResetToken,

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Bearer token could not be issued.
    #[error("token error: {0}")]
    Token(#[from] TokenError),
}
