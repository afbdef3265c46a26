//! Database operations for the identity store.
//!
//! # Database: `SQLite`
//!
//! ## Tables
//!
//! - `user_account` - Accounts (email, display name, password verifier)
//! - `password_reset_token` - Single-use reset tokens (digest only)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/`, embedded at compile
//! time and applied on server start or via:
//! ```bash
//! cargo run -p bolao-cli -- migrate
//! ```

pub mod reset_tokens;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;

/// Errors returned by repositories.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a sqlx error, turning unique-constraint violations into `Conflict`.
    pub(crate) fn from_insert(e: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return Self::Conflict(format!("{what} already exists"));
        }
        Self::Database(e)
    }
}

/// Create a `SQLite` connection pool with sensible defaults.
///
/// The database file is created if missing; foreign keys are enforced and
/// the WAL journal lets readers proceed while a write is in flight.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or the connection cannot be
/// established.
pub async fn create_pool(database_url: &SecretString) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url.expose_secret())?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    SqlitePoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

/// Create a private in-memory database with migrations applied.
///
/// Uses a single connection that is never recycled, since every `SQLite`
/// in-memory connection is its own database.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection or a migration fails.
pub async fn create_in_memory_pool() -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;
    Ok(pool)
}

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns `sqlx::Error` if a migration fails to apply.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
