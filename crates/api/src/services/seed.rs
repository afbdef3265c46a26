//! Start-up seeding of the administrator account.

use secrecy::ExposeSecret;
use tracing::info;

use bolao_core::CreateUserRequest;

use crate::config::AdminSeedConfig;
use crate::services::auth::AuthError;
use crate::services::credentials::CredentialStore;

/// Whether [`ensure_admin`] created the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Created,
    AlreadyPresent,
}

/// Create the configured administrator unless the email is already taken.
///
/// # Errors
///
/// Returns `AuthError::Validation` if the configured values are invalid,
/// or a store error.
pub async fn ensure_admin(
    store: &CredentialStore<'_>,
    seed: &AdminSeedConfig,
) -> Result<SeedOutcome, AuthError> {
    if store.find_by_email(&seed.email).await?.is_some() {
        return Ok(SeedOutcome::AlreadyPresent);
    }

    let request = CreateUserRequest {
        name: seed.name.clone(),
        email: seed.email.clone(),
        password: seed.password.expose_secret().to_string(),
    };

    match store.create(&request).await {
        Ok(user) => {
            info!(user_id = %user.id, email = %user.email, "Administrator account created");
            Ok(SeedOutcome::Created)
        }
        Err(AuthError::UserAlreadyExists) => Ok(SeedOutcome::AlreadyPresent),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;
    use secrecy::SecretString;

    use super::*;
    use crate::config::PasswordHashConfig;
    use crate::db::create_in_memory_pool;
    use crate::services::credentials::CredentialHasher;

    fn seed_config(password: &str) -> AdminSeedConfig {
        AdminSeedConfig {
            email: "admin@example.com".to_string(),
            name: "Administrator".to_string(),
            password: SecretString::from(password),
        }
    }

    #[tokio::test]
    async fn test_ensure_admin_is_idempotent() {
        let pool = create_in_memory_pool().await.unwrap();
        let hasher = CredentialHasher::new(&PasswordHashConfig {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap();
        let store = CredentialStore::new(&pool, &hasher, Duration::hours(1));
        let config = seed_config("Admin#2024");

        assert_eq!(ensure_admin(&store, &config).await.unwrap(), SeedOutcome::Created);
        assert_eq!(
            ensure_admin(&store, &config).await.unwrap(),
            SeedOutcome::AlreadyPresent
        );
    }

    #[tokio::test]
    async fn test_ensure_admin_rejects_weak_password() {
        let pool = create_in_memory_pool().await.unwrap();
        let hasher = CredentialHasher::new(&PasswordHashConfig {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap();
        let store = CredentialStore::new(&pool, &hasher, Duration::hours(1));

        let result = ensure_admin(&store, &seed_config("weak")).await;
        assert!(matches!(result, Err(AuthError::Validation(_))));
    }
}
