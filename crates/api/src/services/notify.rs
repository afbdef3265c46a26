//! Hand-off point for password reset tokens.
//!
//! The service never delivers tokens itself; whatever implements
//! [`ResetNotifier`] is responsible for getting them to the account owner.

use tracing::info;

use crate::models::user::User;

/// Receives freshly issued reset tokens for out-of-band delivery.
pub trait ResetNotifier: Send + Sync {
    /// Called once per issued token.
    fn password_reset_requested(&self, user: &User, token: &str);
}

/// Default notifier: emits the token as a log event.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl ResetNotifier for LogNotifier {
    fn password_reset_requested(&self, user: &User, token: &str) {
        info!(
            user_id = %user.id,
            email = %user.email,
            reset_token = %token,
            "Password reset token issued"
        );
    }
}
