//! In-process user store.
//!
//! Mirrors the `PostgreSQL` store's contract: sequential IDs starting at 1,
//! store-side email uniqueness, and newest-first listing. Nothing survives
//! the process.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use user_form_core::UserId;

use super::{RepositoryError, UserStore};
use crate::models::{NewUser, User};

#[derive(Debug, Default)]
struct Table {
    last_id: i32,
    rows: Vec<User>,
}

/// User store held in memory.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    table: RwLock<Table>,
    schema_calls: AtomicUsize,
}

impl MemoryUserStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times [`UserStore::ensure_schema`] has run against this store.
    #[must_use]
    pub fn schema_calls(&self) -> usize {
        self.schema_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        self.schema_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn insert_user(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let mut table = self.table.write().await;

        if table.rows.iter().any(|row| row.email == user.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        table.last_id += 1;
        let row = User {
            id: UserId::new(table.last_id),
            name: user.name.clone(),
            mobile: user.mobile.clone(),
            email: user.email.clone(),
            created_at: Utc::now(),
        };
        table.rows.push(row.clone());

        Ok(row)
    }

    async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        let table = self.table.read().await;

        let mut rows = table.rows.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(rows)
    }

    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let table = self.table.read().await;
        Ok(table.rows.iter().find(|row| row.id == id).cloned())
    }

    async fn delete_user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let mut table = self.table.write().await;

        let position = table.rows.iter().position(|row| row.id == id);
        Ok(position.map(|index| table.rows.remove(index)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use user_form_core::{Email, Mobile};

    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Ada".to_string(),
            mobile: Mobile::parse("9876543210").unwrap(),
            email: Email::parse(email).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_ids_are_sequential_and_not_reused() {
        let store = MemoryUserStore::new();
        let first = store.insert_user(&new_user("a@example.com")).await.unwrap();
        store.delete_user_by_id(first.id).await.unwrap();
        let second = store.insert_user(&new_user("b@example.com")).await.unwrap();

        assert_eq!(first.id, UserId::new(1));
        assert_eq!(second.id, UserId::new(2));
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryUserStore::new();
        store.insert_user(&new_user("a@example.com")).await.unwrap();

        let err = store
            .insert_user(&new_user("a@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let store = MemoryUserStore::new();
        store.insert_user(&new_user("a@example.com")).await.unwrap();
        store.insert_user(&new_user("b@example.com")).await.unwrap();

        let emails: Vec<_> = store
            .list_users()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.email.into_inner())
            .collect();
        assert_eq!(emails, ["b@example.com", "a@example.com"]);
    }

    #[tokio::test]
    async fn test_delete_returns_prior_row() {
        let store = MemoryUserStore::new();
        let user = store.insert_user(&new_user("a@example.com")).await.unwrap();

        assert_eq!(store.delete_user_by_id(user.id).await.unwrap(), Some(user.clone()));
        assert_eq!(store.delete_user_by_id(user.id).await.unwrap(), None);
        assert_eq!(store.find_user_by_id(user.id).await.unwrap(), None);
    }
}
