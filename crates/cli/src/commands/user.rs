//! Account management commands.
//!
//! Accounts created here go through the same validation and uniqueness
//! rules as `POST /register`.
//!
//! # Environment Variables
//!
//! - `BOLAO_DATABASE_URL` - `SQLite` connection string
//! - `BOLAO_ARGON2_*` - Password hashing cost parameters

use chrono::Duration;
use secrecy::{ExposeSecret, SecretString};

use bolao_api::config::{self, PasswordHashConfig};
use bolao_api::db;
use bolao_api::services::{AuthError, CredentialHasher, CredentialStore};
use bolao_core::{CreateUserRequest, UserId};

use super::CommandError;

/// Create a new account.
///
/// # Returns
///
/// The ID of the created account.
///
/// # Errors
///
/// Returns `CommandError::Account` with every validation failure, or if
/// the email is already registered.
pub async fn create(email: &str, name: &str, password: String) -> Result<UserId, CommandError> {
    let password = SecretString::from(password);
    let database_url = config::database_url_from_env();
    let hashing = PasswordHashConfig::from_env()?;
    let hasher =
        CredentialHasher::new(&hashing).map_err(|e| CommandError::Hashing(e.to_string()))?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;
    db::run_migrations(&pool).await?;

    let store = CredentialStore::new(&pool, &hasher, Duration::zero());
    let request = CreateUserRequest {
        name: name.to_owned(),
        email: email.to_owned(),
        password: password.expose_secret().to_owned(),
    };

    let user = store.create(&request).await.inspect_err(|e| {
        if let AuthError::Validation(reasons) = e {
            for reason in reasons {
                tracing::error!("  - {reason}");
            }
        }
    })?;

    tracing::info!(
        "Account created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );

    Ok(user.id)
}
