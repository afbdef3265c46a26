//! Bolao identity service library.
//!
//! Accounts, bearer tokens and a paginated user directory over `SQLite`,
//! served with axum. The binary in `main.rs` wires this up; the
//! integration tests drive [`routes::app`] directly.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
