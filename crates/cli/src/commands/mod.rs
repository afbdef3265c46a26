//! CLI command implementations.

pub mod migrate;
pub mod tokens;
pub mod user;

use thiserror::Error;

use bolao_api::config::ConfigError;
use bolao_api::db::RepositoryError;
use bolao_api::services::AuthError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database connection or migration error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Repository error.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Account could not be created.
    #[error("{0}")]
    Account(#[from] AuthError),

    /// Argon2 parameters are out of range.
    #[error("Invalid password hashing parameters: {0}")]
    Hashing(String),
}
