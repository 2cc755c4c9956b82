//! Persistence for the user resource.
//!
//! # Table
//!
//! - `users` - the only table; created on demand by [`UserStore::ensure_schema`]
//!
//! # Stores
//!
//! - [`PgUserStore`] - `PostgreSQL` via sqlx (production)
//! - [`MemoryUserStore`] - in-process store with the same contract (tests, local runs)
//!
//! There are no migration files: the single `CREATE TABLE IF NOT EXISTS`
//! statement in [`schema`] is the whole schema. Apply it ahead of time with:
//! ```bash
//! cargo run -p user-form-cli -- migrate
//! ```

pub mod memory;
pub mod schema;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use thiserror::Error;

use user_form_core::UserId;

use crate::models::{NewUser, User};

pub use memory::MemoryUserStore;
pub use users::PgUserStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map an insert failure, singling out unique-constraint violations.
    ///
    /// Only SQLSTATE `23505` becomes [`RepositoryError::Conflict`]; every other
    /// failure (including other constraint classes) stays a database error.
    #[must_use]
    pub fn from_insert(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict("email already exists".to_owned());
        }
        Self::Database(err)
    }
}

/// Storage operations for the user resource.
///
/// Every method is a single statement against the store. Implementations must
/// be safe to share across concurrent requests.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create the `users` table if it does not exist.
    ///
    /// Must succeed when called repeatedly or by concurrent callers.
    async fn ensure_schema(&self) -> Result<(), RepositoryError>;

    /// Insert a validated user and return the persisted row.
    ///
    /// Returns [`RepositoryError::Conflict`] when the email is already taken.
    async fn insert_user(&self, user: &NewUser) -> Result<User, RepositoryError>;

    /// All users, newest first.
    async fn list_users(&self) -> Result<Vec<User>, RepositoryError>;

    /// The user with `id`, if any.
    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Delete the user with `id`, returning the row as it was before deletion.
    async fn delete_user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;
}

fn pool_options() -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// Connects eagerly, so an unreachable database fails here.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    pool_options().connect(database_url.expose_secret()).await
}

/// Create a pool that opens connections on first use.
///
/// Used by the function host so that a cold start never fails before a
/// request can be answered; connection errors surface per request instead.
///
/// # Errors
///
/// Returns `sqlx::Error` only if the connection string cannot be parsed.
pub fn create_lazy_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    let options: PgConnectOptions = database_url.expose_secret().parse()?;
    Ok(pool_options().min_connections(0).connect_lazy_with(options))
}
