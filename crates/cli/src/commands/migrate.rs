//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! bolao-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `BOLAO_DATABASE_URL` - `SQLite` connection string (fallback: `DATABASE_URL`,
//!   default: `sqlite://bolao.db`)
//!
//! Migration files live in `crates/api/migrations/` and are embedded in the
//! binary; the server applies the same set on start-up.

use bolao_api::{config, db};

use super::CommandError;

/// Connect and apply all pending migrations.
///
/// # Errors
///
/// Returns `CommandError::Database` if the connection or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let database_url = config::database_url_from_env();

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running migrations...");
    db::run_migrations(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
