//! Account service: register, login, logout, forget and reset password.
//!
//! Each operation is a single round trip with no session state. Login and
//! password reset never reveal whether an email is registered.

mod error;
pub mod token;

pub use error::AuthError;
pub use token::{TokenClaims, TokenError, TokenIssuer};

use tracing::{info, instrument};

use bolao_core::{
    AuthResponse, CreateUserRequest, ForgetPasswordRequest, LoginRequest, RegisterRequest,
    ResetPasswordRequest,
};

use crate::models::user::{CurrentUser, User};
use crate::services::credentials::CredentialStore;
use crate::services::notify::ResetNotifier;

/// Account service.
///
/// Built per request from borrowed, process-wide collaborators.
pub struct AuthService<'a> {
    store: CredentialStore<'a>,
    tokens: &'a TokenIssuer,
    notifier: &'a dyn ResetNotifier,
}

impl<'a> AuthService<'a> {
    /// Create a new account service.
    #[must_use]
    pub fn new(
        store: CredentialStore<'a>,
        tokens: &'a TokenIssuer,
        notifier: &'a dyn ResetNotifier,
    ) -> Self {
        Self {
            store,
            tokens,
            notifier,
        }
    }

    /// Register a new account and sign it in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` with every invalid field.
    /// Returns `AuthError::UserAlreadyExists` if the email is registered.
    #[instrument(skip_all, fields(email = %request.email))]
    pub async fn register(
        &self,
        request: RegisterRequest,
    ) -> Result<(User, AuthResponse), AuthError> {
        let user = self.store.create(&CreateUserRequest::from(request)).await?;
        info!(user_id = %user.id, "Account registered");
        let response = self.auth_response(&user)?;
        Ok((user, response))
    }

    /// Check email and password and issue a token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown email or a
    /// wrong password alike.
    #[instrument(skip_all)]
    pub async fn login(&self, request: &LoginRequest) -> Result<(User, AuthResponse), AuthError> {
        let Some(user) = self.store.find_by_email(&request.email).await? else {
            self.store.hasher().burn(&request.password);
            return Err(AuthError::InvalidCredentials);
        };

        if !self.store.verify_password(&user, &request.password) {
            return Err(AuthError::InvalidCredentials);
        }

        info!(user_id = %user.id, "Login succeeded");
        let response = self.auth_response(&user)?;
        Ok((user, response))
    }

    /// Acknowledge a logout. Outstanding tokens stay valid until expiry.
    #[allow(clippy::unused_self)]
    pub fn logout(&self, user: &CurrentUser) {
        info!(user_id = %user.id, "Logout acknowledged");
    }

    /// Issue a reset token if the email is registered.
    ///
    /// Unknown emails succeed silently.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the store fails.
    #[instrument(skip_all)]
    pub async fn forget_password(&self, request: &ForgetPasswordRequest) -> Result<(), AuthError> {
        let Some(user) = self.store.find_by_email(&request.email).await? else {
            info!("Password reset requested for unknown email");
            return Ok(());
        };

        let token = self.store.generate_reset_token(&user).await?;
        self.notifier.password_reset_requested(&user, &token);
        Ok(())
    }

    /// Consume a reset token and set a new password.
    ///
    /// The new password is checked before the account is looked up, so the
    /// answer never depends on whether the email is registered.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if the new password violates policy.
    /// Returns `AuthError::InvalidResetToken` for an unknown email or a bad
    /// token alike.
    #[instrument(skip_all)]
    pub async fn reset_password(&self, request: &ResetPasswordRequest) -> Result<(), AuthError> {
        self.store.check_password(&request.new_password)?;

        let Some(user) = self.store.find_by_email(&request.email).await? else {
            self.store.hasher().burn(&request.new_password);
            return Err(AuthError::InvalidResetToken);
        };

        self.store
            .reset_password(&user, &request.token, &request.new_password)
            .await?;
        info!(user_id = %user.id, "Password reset");
        Ok(())
    }

    fn auth_response(&self, user: &User) -> Result<AuthResponse, AuthError> {
        Ok(AuthResponse {
            token: self.tokens.issue(user)?,
            email: user.email.to_string(),
            name: user.name.to_string(),
        })
    }
}
