//! The user resource: create, list, get, delete.

use std::sync::Arc;

use tracing::instrument;

use user_form_core::UserId;

use super::SchemaInitializer;
use crate::db::{RepositoryError, UserStore};
use crate::error::AppError;
use crate::models::{CreateUserRequest, NewUser, User};

/// Validates input and runs the four user operations against a store.
///
/// Every operation first makes sure the schema exists; after the first
/// success that check costs nothing. Cloning shares the store and the
/// schema guard.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    schema: Arc<SchemaInitializer>,
}

impl std::fmt::Debug for UserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService")
            .field("schema_ready", &self.schema.is_ready())
            .finish_non_exhaustive()
    }
}

impl UserService {
    /// Create a service with its own schema guard.
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self::with_schema(store, Arc::new(SchemaInitializer::new()))
    }

    /// Create a service sharing an existing schema guard.
    #[must_use]
    pub const fn with_schema(store: Arc<dyn UserStore>, schema: Arc<SchemaInitializer>) -> Self {
        Self { store, schema }
    }

    /// Get a reference to the underlying store.
    #[must_use]
    pub fn store(&self) -> &dyn UserStore {
        self.store.as_ref()
    }

    /// Make sure the `users` table exists.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` if the DDL fails.
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        self.schema
            .ensure(self.store.as_ref())
            .await
            .map_err(|e| AppError::store("initializing database", e))
    }

    /// Validate and insert a new user.
    ///
    /// # Errors
    ///
    /// - `AppError::Validation` if a field is missing or malformed (the store
    ///   is not touched)
    /// - `AppError::Conflict` if the email is already registered
    /// - `AppError::Store` for any other store failure
    #[instrument(skip(self, request))]
    pub async fn create(&self, request: CreateUserRequest) -> Result<User, AppError> {
        let new_user = NewUser::try_from(request)?;
        self.ensure_schema().await?;

        let user = self
            .store
            .insert_user(&new_user)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AppError::Conflict,
                other => AppError::store("creating user", other),
            })?;

        tracing::info!(user_id = %user.id, "User created");
        Ok(user)
    }

    /// All users, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` if the store fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<User>, AppError> {
        self.ensure_schema().await?;
        self.store
            .list_users()
            .await
            .map_err(|e| AppError::store("fetching users", e))
    }

    /// The user with `id`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if no such user exists, or
    /// `AppError::Store` if the store fails.
    #[instrument(skip(self))]
    pub async fn get(&self, id: UserId) -> Result<User, AppError> {
        self.ensure_schema().await?;
        self.store
            .find_user_by_id(id)
            .await
            .map_err(|e| AppError::store("fetching user", e))?
            .ok_or(AppError::NotFound)
    }

    /// Delete the user with `id`, returning it as it was.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if no such user exists, or
    /// `AppError::Store` if the store fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: UserId) -> Result<User, AppError> {
        self.ensure_schema().await?;
        let user = self
            .store
            .delete_user_by_id(id)
            .await
            .map_err(|e| AppError::store("deleting user", e))?
            .ok_or(AppError::NotFound)?;

        tracing::info!(user_id = %user.id, "User deleted");
        Ok(user)
    }
}

/// Parse the `:id` path segment.
///
/// A segment that is not an integer cannot name any row, so it is reported
/// the same way as a missing user.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the segment is not a valid ID.
pub fn parse_user_id(segment: &str) -> Result<UserId, AppError> {
    UserId::from_path(segment).map_err(|_| AppError::NotFound)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryUserStore;
    use crate::models::ValidationError;

    fn service() -> (UserService, Arc<MemoryUserStore>) {
        let store = Arc::new(MemoryUserStore::new());
        (UserService::new(store.clone()), store)
    }

    fn request(name: &str, mobile: &str, email: &str) -> CreateUserRequest {
        CreateUserRequest {
            name: Some(name.to_string()),
            mobile: Some(mobile.to_string()),
            email: Some(email.to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (service, _) = service();
        let created = service
            .create(request("Ada", "9876543210", "ada@example.com"))
            .await
            .unwrap();

        assert_eq!(service.get(created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_validation_does_not_touch_store() {
        let (service, store) = service();
        let err = service
            .create(request("Ada", "12345", "ada@example.com"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Validation(ValidationError::InvalidMobile)
        ));
        assert_eq!(store.schema_calls(), 0);
        assert!(store.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let (service, _) = service();
        service
            .create(request("Ada", "9876543210", "ada@example.com"))
            .await
            .unwrap();

        let err = service
            .create(request("Other", "0123456789", "ada@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict));
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let (service, store) = service();
        let created = service
            .create(request("Ada", "9876543210", "ada@example.com"))
            .await
            .unwrap();

        assert_eq!(service.delete(created.id).await.unwrap(), created);
        assert!(matches!(
            service.get(created.id).await.unwrap_err(),
            AppError::NotFound
        ));
        assert!(matches!(
            service.delete(created.id).await.unwrap_err(),
            AppError::NotFound
        ));
        assert_eq!(store.schema_calls(), 1);
    }

    #[test]
    fn test_parse_user_id() {
        assert_eq!(parse_user_id("5").unwrap(), UserId::new(5));
        assert!(matches!(parse_user_id("abc"), Err(AppError::NotFound)));
    }
}
