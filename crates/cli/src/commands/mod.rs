//! `uf-cli` subcommands.

pub mod migrate;
pub mod users;

use std::sync::Arc;

use secrecy::SecretString;
use thiserror::Error;
use user_form_api::db::schema::TableColumn;
use user_form_api::db::{self, PgUserStore};
use user_form_api::error::AppError;
use user_form_api::services::UserService;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Could not connect to the database.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// The user service rejected the operation.
    #[error(transparent)]
    Api(#[from] AppError),

    /// Output could not be serialized.
    #[error("Failed to write output: {0}")]
    Output(#[from] serde_json::Error),

    /// The `users` table does not have the expected columns or types.
    #[error("Unexpected users table columns: {}", describe(.0))]
    SchemaMismatch(Vec<TableColumn>),
}

fn describe(columns: &[TableColumn]) -> String {
    columns
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Connect to `database_url` and build a user service over it.
async fn connect(database_url: &SecretString) -> Result<(PgUserStore, UserService), CommandError> {
    tracing::info!("Connecting to database...");
    let pool = db::create_pool(database_url).await?;

    let store = PgUserStore::new(pool);
    let service = UserService::new(Arc::new(store.clone()));

    Ok((store, service))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_mismatch_names_columns_and_types() {
        let err = CommandError::SchemaMismatch(vec![
            TableColumn {
                name: "id".to_string(),
                data_type: "integer".to_string(),
            },
            TableColumn {
                name: "created_at".to_string(),
                data_type: "timestamp without time zone".to_string(),
            },
        ]);

        assert_eq!(
            err.to_string(),
            "Unexpected users table columns: id integer, created_at timestamp without time zone"
        );
    }
}
