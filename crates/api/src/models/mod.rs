//! Domain models for the identity service.

pub mod user;

pub use user::{CurrentUser, PasswordVerifier, User};
