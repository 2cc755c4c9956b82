//! Schema setup command.
//!
//! # Usage
//!
//! ```bash
//! uf-cli migrate
//! ```
//!
//! Runs the same idempotent `CREATE TABLE IF NOT EXISTS users` the server
//! runs at startup (including the `created_at TIMESTAMP` to `TIMESTAMPTZ`
//! upgrade of older tables), then checks the table's column names and types.
//! Safe to run while servers or functions are also initializing.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string

use secrecy::SecretString;
use user_form_api::db::schema::{columns_match, users_table_columns};

use super::{CommandError, connect};

/// Create the `users` table if it does not exist and verify its columns.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable, table creation
/// fails, or the existing table has different columns or column types.
pub async fn run(database_url: &SecretString) -> Result<(), CommandError> {
    let (store, service) = connect(database_url).await?;

    tracing::info!("Creating users table...");
    service.ensure_schema().await?;

    let columns = users_table_columns(store.pool()).await?;
    if !columns_match(&columns) {
        return Err(CommandError::SchemaMismatch(columns));
    }

    tracing::info!(columns = columns.len(), "Schema ready");
    Ok(())
}
