//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Registration, login, logout, password reset; bearer tokens
//! - `credentials` - Credential store over accounts and reset tokens
//! - `notify` - Reset token hand-off
//! - `seed` - Administrator account seeding
//! - `users` - Directory listing and account administration

pub mod auth;
pub mod credentials;
pub mod notify;
pub mod seed;
pub mod users;

pub use auth::{AuthError, AuthService, TokenClaims, TokenError, TokenIssuer};
pub use credentials::{CredentialHasher, CredentialStore};
pub use notify::{LogNotifier, ResetNotifier};
pub use seed::{SeedOutcome, ensure_admin};
pub use users::UserService;
