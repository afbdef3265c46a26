//! Credential store: accounts, password verifiers and reset tokens.
//!
//! Passwords are hashed with Argon2id. Reset tokens are 32 random bytes,
//! handed out URL-safe base64 encoded; only their SHA-256 digest is stored.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;

use bolao_core::{
    CreateUserRequest, DisplayName, Email, PasswordPolicy, ResetTokenId, UserId,
};

use crate::config::PasswordHashConfig;
use crate::db::RepositoryError;
use crate::db::reset_tokens::{NewResetToken, PasswordResetRepository, Redemption};
use crate::db::users::{NewUser, UserQuery, UserRepository};
use crate::models::user::User;
use crate::services::auth::AuthError;

const RESET_TOKEN_BYTES: usize = 32;

/// Argon2id hasher with configured cost parameters.
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl CredentialHasher {
    /// Build a hasher from cost parameters.
    ///
    /// # Errors
    ///
    /// Returns `argon2::Error` if the parameters are out of range.
    pub fn new(config: &PasswordHashConfig) -> Result<Self, argon2::Error> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a password with a fresh salt.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if hashing fails.
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|_| AuthError::PasswordHash)
    }

    /// Check a password against a PHC string. Malformed hashes never match.
    #[must_use]
    pub fn verify(&self, password: &str, phc: &str) -> bool {
        PasswordHash::new(phc).is_ok_and(|parsed| {
            self.argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
    }

    /// Spend the same work as a verification without checking anything.
    ///
    /// Used when the account doesn't exist so response timing stays uniform.
    pub fn burn(&self, password: &str) {
        let _ = self.hash(password);
    }
}

impl std::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("params", self.argon2.params())
            .finish()
    }
}

/// Durable account records plus the password-verification primitive.
pub struct CredentialStore<'a> {
    users: UserRepository<'a>,
    resets: PasswordResetRepository<'a>,
    hasher: &'a CredentialHasher,
    policy: PasswordPolicy,
    reset_ttl: Duration,
}

impl<'a> CredentialStore<'a> {
    /// Create a credential store over `pool`.
    #[must_use]
    pub fn new(pool: &'a SqlitePool, hasher: &'a CredentialHasher, reset_ttl: Duration) -> Self {
        Self {
            users: UserRepository::new(pool),
            resets: PasswordResetRepository::new(pool),
            hasher,
            policy: PasswordPolicy::default(),
            reset_ttl,
        }
    }

    /// Hasher backing this store.
    #[must_use]
    pub const fn hasher(&self) -> &CredentialHasher {
        self.hasher
    }

    /// Case-insensitive lookup. A malformed email simply has no account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the query fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let Ok(email) = Email::parse(email) else {
            return Ok(None);
        };
        Ok(self.users.get_by_email(&email).await?)
    }

    /// Lookup by id.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the query fails.
    pub async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AuthError> {
        Ok(self.users.get_by_id(id).await?)
    }

    /// Validate and create a confirmed account.
    ///
    /// Every invalid field is reported. The pre-check for an existing email
    /// is an optimization; the unique index decides under concurrency.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` listing every invalid field.
    /// Returns `AuthError::UserAlreadyExists` if the email is taken.
    /// Returns `AuthError::PasswordHash` if hashing fails.
    pub async fn create(&self, request: &CreateUserRequest) -> Result<User, AuthError> {
        let mut errors = Vec::new();

        let name = DisplayName::parse(&request.name)
            .map_err(|e| errors.push(e.to_string()))
            .ok();
        let email = Email::parse(&request.email)
            .map_err(|e| errors.push(e.to_string()))
            .ok();
        if let Err(violations) = self.policy.validate(&request.password) {
            errors.extend(violations.iter().map(ToString::to_string));
        }

        let (Some(name), Some(email)) = (name, email) else {
            return Err(AuthError::Validation(errors));
        };
        if !errors.is_empty() {
            return Err(AuthError::Validation(errors));
        }

        if self.users.get_by_email(&email).await?.is_some() {
            return Err(AuthError::UserAlreadyExists);
        }

        let password_hash = self.hasher.hash(&request.password)?;

        self.users
            .create(&NewUser {
                id: UserId::generate(),
                email: &email,
                name: &name,
                password_hash: &password_hash,
                created_at: Utc::now(),
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })
    }

    /// Check a candidate password against the policy.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` listing every violated rule.
    pub fn check_password(&self, password: &str) -> Result<(), AuthError> {
        self.policy.validate(password).map_err(|violations| {
            AuthError::Validation(violations.iter().map(ToString::to_string).collect())
        })
    }

    /// Compare a password with the account's verifier. Never errors.
    #[must_use]
    pub fn verify_password(&self, user: &User, password: &str) -> bool {
        self.hasher.verify(password, user.password.as_phc())
    }

    /// Delete an account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if no account has this id.
    pub async fn delete(&self, id: UserId) -> Result<(), AuthError> {
        if self.users.delete(id).await? {
            Ok(())
        } else {
            Err(AuthError::UserNotFound)
        }
    }

    /// Page through accounts.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the query fails.
    pub async fn list(&self, query: &UserQuery) -> Result<(Vec<User>, u64), AuthError> {
        Ok(self.users.list(query).await?)
    }

    /// Issue a single-use reset token bound to `user`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the token cannot be stored.
    pub async fn generate_reset_token(&self, user: &User) -> Result<String, AuthError> {
        let mut bytes = [0u8; RESET_TOKEN_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        let token = URL_SAFE_NO_PAD.encode(bytes);

        let now = Utc::now();
        self.resets
            .insert(&NewResetToken {
                id: ResetTokenId::generate(),
                user_id: user.id,
                token_hash: &token_digest(&token),
                created_at: now,
                expires_at: now + self.reset_ttl,
            })
            .await?;

        Ok(token)
    }

    /// Consume a reset token and set a new password.
    ///
    /// The new password is checked against the policy before the token is
    /// touched, so a rejected password leaves the token usable.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if the new password violates policy.
    /// Returns `AuthError::InvalidResetToken` if the token is unknown,
    /// expired, already used, or bound to another account.
    pub async fn reset_password(
        &self,
        user: &User,
        token: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        self.check_password(new_password)?;

        let password_hash = self.hasher.hash(new_password)?;
        let outcome = self
            .resets
            .redeem(user.id, &token_digest(token.trim()), &password_hash, Utc::now())
            .await?;

        match outcome {
            Redemption::Redeemed => Ok(()),
            Redemption::Unknown | Redemption::Expired => Err(AuthError::InvalidResetToken),
        }
    }
}

/// Hex SHA-256 of a reset token, as stored.
fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
