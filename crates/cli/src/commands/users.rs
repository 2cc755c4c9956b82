//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! uf-cli users list
//! uf-cli users show 42
//! uf-cli users create -n "Ada Lovelace" -m 9876543210 -e ada@example.com
//! uf-cli users delete 42
//! ```
//!
//! Each command goes through the same `UserService` as the HTTP API, so
//! validation, messages, and schema setup are identical. Results are written
//! to stdout as pretty-printed JSON.

use std::io::Write;

use secrecy::SecretString;
use serde::Serialize;
use user_form_api::models::CreateUserRequest;
use user_form_api::services::parse_user_id;

use super::{CommandError, connect};

/// List all users, newest first.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or the query fails.
pub async fn list(database_url: &SecretString) -> Result<(), CommandError> {
    let (_, service) = connect(database_url).await?;
    let users = service.list().await?;
    tracing::info!(count = users.len(), "Fetched users");
    write_json(&users)
}

/// Show one user.
///
/// # Errors
///
/// Returns `CommandError` if `id` does not name an existing user.
pub async fn show(database_url: &SecretString, id: &str) -> Result<(), CommandError> {
    let id = parse_user_id(id)?;
    let (_, service) = connect(database_url).await?;
    write_json(&service.get(id).await?)
}

/// Create a user.
///
/// # Errors
///
/// Returns `CommandError` if validation fails or the email is taken.
pub async fn create(
    database_url: &SecretString,
    name: String,
    mobile: String,
    email: String,
) -> Result<(), CommandError> {
    let request = CreateUserRequest {
        name: Some(name),
        mobile: Some(mobile),
        email: Some(email),
    };

    let (_, service) = connect(database_url).await?;
    let user = service.create(request).await?;
    tracing::info!(id = %user.id, "User created");
    write_json(&user)
}

/// Delete a user and print the deleted record.
///
/// # Errors
///
/// Returns `CommandError` if `id` does not name an existing user.
pub async fn delete(database_url: &SecretString, id: &str) -> Result<(), CommandError> {
    let id = parse_user_id(id)?;
    let (_, service) = connect(database_url).await?;
    let user = service.delete(id).await?;
    tracing::info!(id = %user.id, "User deleted");
    write_json(&user)
}

fn write_json<T: Serialize>(value: &T) -> Result<(), CommandError> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout).map_err(serde_json::Error::io)?;
    Ok(())
}
