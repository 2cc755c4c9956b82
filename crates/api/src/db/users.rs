//! `PostgreSQL` user store.
//!
//! Queries are built with `sqlx::query_as` against [`UserRow`] and converted
//! into the validated [`User`] domain type on the way out.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use user_form_core::{Email, Mobile, UserId};

use super::{RepositoryError, UserStore, schema};
use crate::models::{NewUser, User};

/// Raw `users` row.
#[derive(Debug, sqlx::FromRow)]
pub struct UserRow {
    pub id: i32,
    pub name: String,
    pub mobile: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let mobile = Mobile::parse(&row.mobile).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid mobile in database: {e}"))
        })?;
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            name: row.name,
            mobile,
            email,
            created_at: row.created_at,
        })
    }
}

/// User store backed by a `PostgreSQL` pool.
///
/// Cloning is cheap; the pool is reference-counted.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Create a new user store over `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    #[instrument(skip(self))]
    async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        schema::create_users_table(&self.pool).await?;
        Ok(())
    }

    #[instrument(skip(self, user), fields(email = %user.email))]
    async fn insert_user(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (name, mobile, email)
            VALUES ($1, $2, $3)
            RETURNING id, name, mobile, email, created_at
            ",
        )
        .bind(&user.name)
        .bind(&user.mobile)
        .bind(&user.email)
        .fetch_one(&self.pool)
        .await
        .map_err(RepositoryError::from_insert)?;

        row.try_into()
    }

    #[instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, name, mobile, email, created_at
            FROM users
            ORDER BY created_at DESC, id DESC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, name, mobile, email, created_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn delete_user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            DELETE FROM users
            WHERE id = $1
            RETURNING id, name, mobile, email, created_at
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }
}
