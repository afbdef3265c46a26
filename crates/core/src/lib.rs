//! Bolao Core - Shared types library.
//!
//! This crate provides the types shared by every Bolao component:
//! - `api` - The identity HTTP service
//! - `cli` - Command-line tools for migrations and account seeding
//! - `integration-tests` - End-to-end tests that speak the wire format
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere, including from API clients.
//!
//! # Modules
//!
//! - [`types`] - Validated newtypes for ids, emails, display names and passwords
//! - [`api`] - Request bodies and the response envelope exchanged over HTTP

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod types;

pub use api::*;
pub use types::*;
