//! Password reset token repository.
//!
//! Only the SHA-256 digest of a token is stored. Redemption happens in one
//! transaction: the token is marked used, the account's verifier replaced,
//! and every other outstanding token for the account retired.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use bolao_core::{ResetTokenId, UserId};

use super::RepositoryError;

/// Values for a newly issued reset token.
#[derive(Debug)]
pub struct NewResetToken<'a> {
    pub id: ResetTokenId,
    pub user_id: UserId,
    pub token_hash: &'a str,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Outcome of a redemption attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redemption {
    /// Token accepted; the password was replaced.
    Redeemed,
    /// No unused token with that digest exists for the account.
    Unknown,
    /// The token exists but has expired.
    Expired,
}

/// Repository for password reset tokens.
pub struct PasswordResetRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PasswordResetRepository<'a> {
    /// Create a new reset token repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a newly issued token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a digest collision.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn insert(&self, token: &NewResetToken<'_>) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO password_reset_token (id, user_id, token_hash, created_at, expires_at)
            VALUES (?, ?, ?, ?, ?)
            ",
        )
        .bind(token.id.to_string())
        .bind(token.user_id.to_string())
        .bind(token.token_hash)
        .bind(token.created_at)
        .bind(token.expires_at)
        .execute(self.pool)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "reset token"))?;

        Ok(())
    }

    /// Redeem a token and replace the account's password verifier.
    ///
    /// The token is claimed with a `used_at IS NULL` guard before anything
    /// else, so of two concurrent redemptions at most one succeeds.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; the
    /// transaction is rolled back.
    pub async fn redeem(
        &self,
        user_id: UserId,
        token_hash: &str,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Redemption, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let claimed: Option<(String, DateTime<Utc>)> = sqlx::query_as(
            r"
            UPDATE password_reset_token
            SET used_at = ?
            WHERE user_id = ? AND token_hash = ? AND used_at IS NULL
            RETURNING id, expires_at
            ",
        )
        .bind(now)
        .bind(user_id.to_string())
        .bind(token_hash)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((token_id, expires_at)) = claimed else {
            tx.rollback().await?;
            return Ok(Redemption::Unknown);
        };

        if expires_at <= now {
            tx.rollback().await?;
            return Ok(Redemption::Expired);
        }

        let updated = sqlx::query("UPDATE user_account SET password_hash = ? WHERE id = ?")
            .bind(new_password_hash)
            .bind(user_id.to_string())
            .execute(&mut *tx)
            .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(Redemption::Unknown);
        }

        sqlx::query(
            r"
            UPDATE password_reset_token
            SET used_at = ?
            WHERE user_id = ? AND used_at IS NULL AND id != ?
            ",
        )
        .bind(now)
        .bind(user_id.to_string())
        .bind(&token_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Redemption::Redeemed)
    }

    /// Delete tokens that expired or were used before `cutoff`.
    ///
    /// Timestamps are stored as RFC 3339 UTC text, which orders the same as
    /// the instants, so the comparison runs in SQL.
    ///
    /// # Returns
    ///
    /// The number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM password_reset_token WHERE expires_at <= ? OR used_at <= ?",
        )
        .bind(cutoff)
        .bind(cutoff)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use bolao_core::{DisplayName, Email};

    use super::*;
    use crate::db::create_in_memory_pool;
    use crate::db::users::{NewUser, UserRepository};

    async fn seed_user(pool: &SqlitePool) -> UserId {
        let email = Email::parse("reset@example.com").unwrap();
        let name = DisplayName::parse("Reset").unwrap();
        let id = UserId::generate();
        UserRepository::new(pool)
            .create(&NewUser {
                id,
                email: &email,
                name: &name,
                password_hash: "old-hash",
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        id
    }

    async fn issue(repo: &PasswordResetRepository<'_>, user_id: UserId, hash: &str, ttl: Duration) {
        let now = Utc::now();
        repo.insert(&NewResetToken {
            id: ResetTokenId::generate(),
            user_id,
            token_hash: hash,
            created_at: now,
            expires_at: now + ttl,
        })
        .await
        .unwrap();
    }

    async fn stored_hash(pool: &SqlitePool, user_id: UserId) -> String {
        sqlx::query_scalar("SELECT password_hash FROM user_account WHERE id = ?")
            .bind(user_id.to_string())
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_redeem_is_single_use() {
        let pool = create_in_memory_pool().await.unwrap();
        let user_id = seed_user(&pool).await;
        let repo = PasswordResetRepository::new(&pool);
        issue(&repo, user_id, "digest-a", Duration::hours(1)).await;

        let first = repo.redeem(user_id, "digest-a", "new-hash", Utc::now()).await.unwrap();
        assert_eq!(first, Redemption::Redeemed);
        assert_eq!(stored_hash(&pool, user_id).await, "new-hash");

        let second = repo.redeem(user_id, "digest-a", "other", Utc::now()).await.unwrap();
        assert_eq!(second, Redemption::Unknown);
        assert_eq!(stored_hash(&pool, user_id).await, "new-hash");
    }

    #[tokio::test]
    async fn test_redeem_retires_other_tokens() {
        let pool = create_in_memory_pool().await.unwrap();
        let user_id = seed_user(&pool).await;
        let repo = PasswordResetRepository::new(&pool);
        issue(&repo, user_id, "digest-a", Duration::hours(1)).await;
        issue(&repo, user_id, "digest-b", Duration::hours(1)).await;

        let result = repo.redeem(user_id, "digest-b", "new-hash", Utc::now()).await.unwrap();
        assert_eq!(result, Redemption::Redeemed);

        let stale = repo.redeem(user_id, "digest-a", "x", Utc::now()).await.unwrap();
        assert_eq!(stale, Redemption::Unknown);
    }

    #[tokio::test]
    async fn test_expired_token_leaves_password() {
        let pool = create_in_memory_pool().await.unwrap();
        let user_id = seed_user(&pool).await;
        let repo = PasswordResetRepository::new(&pool);
        issue(&repo, user_id, "digest-a", Duration::minutes(5)).await;

        let later = Utc::now() + Duration::minutes(10);
        let result = repo.redeem(user_id, "digest-a", "new-hash", later).await.unwrap();
        assert_eq!(result, Redemption::Expired);
        assert_eq!(stored_hash(&pool, user_id).await, "old-hash");
    }

    #[tokio::test]
    async fn test_token_bound_to_account() {
        let pool = create_in_memory_pool().await.unwrap();
        let user_id = seed_user(&pool).await;
        let repo = PasswordResetRepository::new(&pool);
        issue(&repo, user_id, "digest-a", Duration::hours(1)).await;

        let result = repo
            .redeem(UserId::generate(), "digest-a", "new-hash", Utc::now())
            .await
            .unwrap();
        assert_eq!(result, Redemption::Unknown);
    }

    #[tokio::test]
    async fn test_purge_removes_expired() {
        let pool = create_in_memory_pool().await.unwrap();
        let user_id = seed_user(&pool).await;
        let repo = PasswordResetRepository::new(&pool);
        issue(&repo, user_id, "short", Duration::minutes(1)).await;
        issue(&repo, user_id, "long", Duration::days(1)).await;

        let removed = repo.purge_before(Utc::now() + Duration::hours(1)).await.unwrap();
        assert_eq!(removed, 1);
    }

    #[tokio::test]
    async fn test_purge_keeps_recent_and_outstanding_tokens() {
        let pool = create_in_memory_pool().await.unwrap();
        let user_id = seed_user(&pool).await;
        let repo = PasswordResetRepository::new(&pool);
        issue(&repo, user_id, "used", Duration::days(1)).await;
        issue(&repo, user_id, "outstanding", Duration::days(1)).await;

        let used_at = Utc::now();
        repo.redeem(user_id, "used", "new-hash", used_at).await.unwrap();

        // Redemption retired both tokens at `used_at`.
        assert_eq!(repo.purge_before(used_at - Duration::seconds(1)).await.unwrap(), 0);
        assert_eq!(repo.purge_before(used_at + Duration::milliseconds(1)).await.unwrap(), 2);

        issue(&repo, user_id, "fresh", Duration::days(1)).await;
        assert_eq!(repo.purge_before(Utc::now()).await.unwrap(), 0);

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM password_reset_token")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(remaining, 1);
    }

    #[tokio::test]
    async fn test_tokens_cascade_with_account() {
        let pool = create_in_memory_pool().await.unwrap();
        let user_id = seed_user(&pool).await;
        let repo = PasswordResetRepository::new(&pool);
        issue(&repo, user_id, "digest-a", Duration::hours(1)).await;

        UserRepository::new(&pool).delete(user_id).await.unwrap();
        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM password_reset_token")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }
}
