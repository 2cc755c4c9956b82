//! Application state shared across handlers.

use std::sync::Arc;

use crate::db::UserStore;
use crate::services::UserService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and owns the user service,
/// which in turn owns the store and the schema-initialization guard. Each
/// process (or serverless cold start) builds exactly one.
#[derive(Clone, Debug)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

#[derive(Debug)]
struct AppStateInner {
    users: UserService,
    base_path: String,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `store` - Backing user store
    /// * `base_path` - Normalized prefix the user routes are mounted under
    ///   (used for the endpoint list in the service banner)
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>, base_path: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                users: UserService::new(store),
                base_path: base_path.into(),
            }),
        }
    }

    /// Get a reference to the user service.
    #[must_use]
    pub fn users(&self) -> &UserService {
        &self.inner.users
    }

    /// Prefix the user routes are mounted under.
    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.inner.base_path
    }
}
