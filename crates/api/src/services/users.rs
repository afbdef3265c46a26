//! Directory service: account listing and administration.

use tracing::{info, instrument};

use bolao_core::{CreateUserRequest, PageRequest, PaginatedResponse, UserId, UserResponse};

use crate::db::users::UserQuery;
use crate::services::auth::AuthError;
use crate::services::credentials::CredentialStore;

/// Directory service over the credential store.
pub struct UserService<'a> {
    store: CredentialStore<'a>,
}

impl<'a> UserService<'a> {
    /// Create a new directory service.
    #[must_use]
    pub fn new(store: CredentialStore<'a>) -> Self {
        Self { store }
    }

    /// Create an account on behalf of an authenticated caller.
    ///
    /// # Errors
    ///
    /// Same as registration: `AuthError::Validation` or
    /// `AuthError::UserAlreadyExists`.
    #[instrument(skip_all, fields(email = %request.email))]
    pub async fn create_user(&self, request: &CreateUserRequest) -> Result<UserResponse, AuthError> {
        let user = self.store.create(request).await?;
        info!(user_id = %user.id, "Account created");
        Ok(user.to_response())
    }

    /// List accounts whose name contains `name`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the store fails.
    pub async fn list_users(
        &self,
        name: Option<String>,
        page: PageRequest,
    ) -> Result<PaginatedResponse<UserResponse>, AuthError> {
        let query = UserQuery {
            name_contains: name,
            page,
        };
        let (users, total) = self.store.list(&query).await?;
        let items = users.iter().map(crate::models::User::to_response).collect();
        Ok(PaginatedResponse::new(items, total, page))
    }

    /// Fetch one account. A malformed id is simply not found.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if no account has this id.
    pub async fn get_user(&self, id: &str) -> Result<UserResponse, AuthError> {
        let id = UserId::parse(id).map_err(|_| AuthError::UserNotFound)?;
        self.store
            .find_by_id(id)
            .await?
            .map(|user| user.to_response())
            .ok_or(AuthError::UserNotFound)
    }

    /// Delete one account. A malformed id is simply not found.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if no account has this id.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: &str) -> Result<(), AuthError> {
        let id = UserId::parse(id).map_err(|_| AuthError::UserNotFound)?;
        self.store.delete(id).await?;
        info!(user_id = %id, "Account deleted");
        Ok(())
    }
}
