//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::ApiConfig;
use crate::services::{
    AuthService, CredentialHasher, CredentialStore, LogNotifier, ResetNotifier, TokenIssuer,
    UserService,
};

/// Error building application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("invalid argon2 parameters: {0}")]
    PasswordHashing(String),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The token issuer, hasher and notifier are
/// built once here and lent to the per-request services.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: SqlitePool,
    tokens: TokenIssuer,
    hasher: CredentialHasher,
    notifier: Arc<dyn ResetNotifier>,
}

impl AppState {
    /// Create a new application state that logs reset tokens.
    ///
    /// # Errors
    ///
    /// Returns `StateError::PasswordHashing` if the Argon2 parameters are
    /// out of range.
    pub fn new(config: ApiConfig, pool: SqlitePool) -> Result<Self, StateError> {
        Self::with_notifier(config, pool, Arc::new(LogNotifier))
    }

    /// Create a new application state with a custom reset notifier.
    ///
    /// # Errors
    ///
    /// Returns `StateError::PasswordHashing` if the Argon2 parameters are
    /// out of range.
    pub fn with_notifier(
        config: ApiConfig,
        pool: SqlitePool,
        notifier: Arc<dyn ResetNotifier>,
    ) -> Result<Self, StateError> {
        let tokens = TokenIssuer::new(&config.token);
        let hasher = CredentialHasher::new(&config.password_hashing)
            .map_err(|e| StateError::PasswordHashing(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                tokens,
                hasher,
                notifier,
            }),
        })
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    /// Get a reference to the bearer token issuer.
    #[must_use]
    pub fn tokens(&self) -> &TokenIssuer {
        &self.inner.tokens
    }

    /// Credential store borrowing this state's pool and hasher.
    #[must_use]
    pub fn credentials(&self) -> CredentialStore<'_> {
        CredentialStore::new(
            &self.inner.pool,
            &self.inner.hasher,
            self.inner.config.reset_token_ttl,
        )
    }

    /// Account service for one request.
    #[must_use]
    pub fn auth_service(&self) -> AuthService<'_> {
        AuthService::new(
            self.credentials(),
            &self.inner.tokens,
            self.inner.notifier.as_ref(),
        )
    }

    /// Directory service for one request.
    #[must_use]
    pub fn user_service(&self) -> UserService<'_> {
        UserService::new(self.credentials())
    }
}
