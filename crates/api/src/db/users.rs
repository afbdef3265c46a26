//! Account repository for database operations.
//!
//! Queries are plain runtime-checked `sqlx` statements; listings are
//! composed with `QueryBuilder` so the count and the page share one filter.

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use bolao_core::{DisplayName, Email, PageRequest, UserId};

use super::RepositoryError;
use crate::models::user::{PasswordVerifier, User};

const USER_COLUMNS: &str =
    "id, email, name, password_hash, email_confirmed, created_at";

/// Internal row type for database queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: String,
    email: String,
    name: String,
    password_hash: String,
    email_confirmed: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let id = UserId::parse(&row.id).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid user id in database: {e}"))
        })?;
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let name = DisplayName::parse(&row.name).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid name in database: {e}"))
        })?;

        Ok(Self {
            id,
            email,
            name,
            email_confirmed: row.email_confirmed,
            created_at: row.created_at,
            password: PasswordVerifier::new(row.password_hash),
        })
    }
}

/// Values for a new account row.
#[derive(Debug)]
pub struct NewUser<'a> {
    pub id: UserId,
    pub email: &'a Email,
    pub name: &'a DisplayName,
    pub password_hash: &'a str,
    pub created_at: DateTime<Utc>,
}

/// Filter and page for an account listing.
#[derive(Debug, Clone, Default)]
pub struct UserQuery {
    /// Substring the display name must contain. Blank means no filter.
    pub name_contains: Option<String>,
    /// Which page to return.
    pub page: PageRequest,
}

impl UserQuery {
    /// The effective name filter, if any.
    fn name_filter(&self) -> Option<&str> {
        self.name_contains
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }

    /// Append the `WHERE` clause for this query.
    fn push_filter(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        if let Some(term) = self.name_filter() {
            builder.push(" WHERE name LIKE ");
            builder.push_bind(format!("%{}%", escape_like(term)));
            builder.push(" ESCAPE '\\'");
        }
    }
}

/// Escape `LIKE` wildcards so the term matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Repository for account database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get an account by email, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM user_account WHERE normalized_email = ?"
        ))
        .bind(email.normalized())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get an account by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM user_account WHERE id = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Insert a new, already-confirmed account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, new_user: &NewUser<'_>) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r"
            INSERT INTO user_account
                (id, email, normalized_email, name, password_hash, email_confirmed, created_at)
            VALUES (?, ?, ?, ?, ?, 1, ?)
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(new_user.id.to_string())
        .bind(new_user.email.as_str())
        .bind(new_user.email.normalized())
        .bind(new_user.name.as_str())
        .bind(new_user.password_hash)
        .bind(new_user.created_at)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "email"))?;

        row.try_into()
    }

    /// Delete an account. Its reset tokens go with it.
    ///
    /// # Returns
    ///
    /// Returns `true` if the account was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM user_account WHERE id = ?")
            .bind(id.to_string())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Count and fetch one page of accounts, oldest first.
    ///
    /// # Returns
    ///
    /// The page of accounts and the total number matching the filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either query fails.
    pub async fn list(&self, query: &UserQuery) -> Result<(Vec<User>, u64), RepositoryError> {
        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM user_account");
        query.push_filter(&mut count);
        let total: i64 = count.build_query_scalar().fetch_one(self.pool).await?;

        let mut select =
            QueryBuilder::<Sqlite>::new(format!("SELECT {USER_COLUMNS} FROM user_account"));
        query.push_filter(&mut select);
        select.push(" ORDER BY created_at ASC, id ASC LIMIT ");
        select.push_bind(i64::from(query.page.page_size()));
        select.push(" OFFSET ");
        select.push_bind(i64::try_from(query.page.offset()).unwrap_or(i64::MAX));

        let rows: Vec<UserRow> = select.build_query_as().fetch_all(self.pool).await?;
        let users = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<User>, _>>()?;

        Ok((users, u64::try_from(total).unwrap_or(0)))
    }
}
