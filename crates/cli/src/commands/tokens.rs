//! Password reset token maintenance.

use chrono::{Duration, Utc};

use bolao_api::config;
use bolao_api::db::{self, reset_tokens::PasswordResetRepository};

use super::CommandError;

/// Delete tokens that expired or were used more than `older_than_hours` ago.
///
/// # Errors
///
/// Returns `CommandError::Database` or `CommandError::Repository` on failure.
pub async fn purge(older_than_hours: i64) -> Result<u64, CommandError> {
    let database_url = config::database_url_from_env();
    let pool = db::create_pool(&database_url).await?;

    let cutoff = Utc::now() - Duration::hours(older_than_hours.max(0));
    let removed = PasswordResetRepository::new(&pool)
        .purge_before(cutoff)
        .await?;

    tracing::info!(removed, %cutoff, "Purged password reset tokens");
    Ok(removed)
}
