//! Core types for Bolao.
//!
//! This module provides type-safe wrappers for the account domain.

pub mod display_name;
pub mod email;
pub mod id;
pub mod pagination;
pub mod password;

pub use display_name::{DisplayName, DisplayNameError};
pub use email::{Email, EmailError};
pub use id::*;
pub use pagination::PageRequest;
pub use password::{PasswordPolicy, PasswordViolation};
