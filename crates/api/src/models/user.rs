//! Account domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};

use bolao_core::{DisplayName, Email, UserId, UserResponse};

/// An account (domain type).
#[derive(Debug, Clone)]
pub struct User {
    /// Unique, immutable account ID.
    pub id: UserId,
    /// Login identity, unique case-insensitively.
    pub email: Email,
    /// Free-text display name.
    pub name: DisplayName,
    /// Always true: accounts are created confirmed.
    pub email_confirmed: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// Salted hash of the current password.
    pub password: PasswordVerifier,
}

impl User {
    /// Public view of this account.
    #[must_use]
    pub fn to_response(&self) -> UserResponse {
        UserResponse {
            id: self.id,
            name: self.name.to_string(),
            email: self.email.to_string(),
            created_at: self.created_at,
        }
    }
}

/// Argon2 PHC string for an account's password.
///
/// Only ever compared against; it has no `Serialize` impl and its `Debug`
/// output is redacted so it cannot leak into responses or logs.
#[derive(Clone)]
pub struct PasswordVerifier(String);

impl PasswordVerifier {
    pub(crate) const fn new(phc: String) -> Self {
        Self(phc)
    }

    pub(crate) fn as_phc(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for PasswordVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordVerifier([REDACTED])")
    }
}

/// Identity carried by a validated bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: String,
    pub name: String,
}
