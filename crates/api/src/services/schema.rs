//! Schema initialization guard.

use tokio::sync::OnceCell;

use crate::db::{RepositoryError, UserStore};

/// Runs [`UserStore::ensure_schema`] at most once per successful
/// initialization.
///
/// Concurrent first callers wait on the same attempt. A failed attempt
/// leaves the guard uninitialized, so the next caller retries.
#[derive(Debug, Default)]
pub struct SchemaInitializer {
    ready: OnceCell<()>,
}

impl SchemaInitializer {
    /// Create a guard that has not run yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ready: OnceCell::new(),
        }
    }

    /// Make sure the schema exists, running the DDL on first use.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the DDL fails.
    pub async fn ensure(&self, store: &dyn UserStore) -> Result<(), RepositoryError> {
        self.ready
            .get_or_try_init(|| async {
                tracing::debug!("Initializing database schema");
                store.ensure_schema().await
            })
            .await?;
        Ok(())
    }

    /// Whether the schema has been initialized by this guard.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.initialized()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use user_form_core::UserId;

    use super::*;
    use crate::db::MemoryUserStore;
    use crate::models::{NewUser, User};

    #[tokio::test]
    async fn test_runs_once_when_called_twice() {
        let store = MemoryUserStore::new();
        let guard = SchemaInitializer::new();

        guard.ensure(&store).await.unwrap();
        guard.ensure(&store).await.unwrap();

        assert!(guard.is_ready());
        assert_eq!(store.schema_calls(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_runs_once_under_concurrent_first_calls() {
        let store = Arc::new(MemoryUserStore::new());
        let guard = Arc::new(SchemaInitializer::new());

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                let guard = Arc::clone(&guard);
                tokio::spawn(async move { guard.ensure(store.as_ref()).await })
            })
            .collect();

        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(store.schema_calls(), 1);
    }

    /// Store whose DDL fails a fixed number of times before succeeding.
    struct FlakySchemaStore {
        failures_left: AtomicUsize,
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl UserStore for FlakySchemaStore {
        async fn ensure_schema(&self) -> Result<(), RepositoryError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            let left = self.failures_left.load(Ordering::SeqCst);
            if left > 0 {
                self.failures_left.store(left - 1, Ordering::SeqCst);
                return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
            }
            Ok(())
        }

        async fn insert_user(&self, _user: &NewUser) -> Result<User, RepositoryError> {
            Err(RepositoryError::NotFound)
        }

        async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
            Ok(Vec::new())
        }

        async fn find_user_by_id(&self, _id: UserId) -> Result<Option<User>, RepositoryError> {
            Ok(None)
        }

        async fn delete_user_by_id(&self, _id: UserId) -> Result<Option<User>, RepositoryError> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let store = FlakySchemaStore {
            failures_left: AtomicUsize::new(1),
            attempts: AtomicUsize::new(0),
        };
        let guard = SchemaInitializer::new();

        assert!(guard.ensure(&store).await.is_err());
        assert!(!guard.is_ready());

        guard.ensure(&store).await.unwrap();
        guard.ensure(&store).await.unwrap();
        assert!(guard.is_ready());
        assert_eq!(store.attempts.load(Ordering::SeqCst), 2);
    }
}
