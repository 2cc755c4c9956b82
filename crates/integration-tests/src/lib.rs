//! Integration tests for the User Form API.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests (no database needed)
//! cargo test -p user-form-integration-tests
//!
//! # Also run the live PostgreSQL tests
//! TEST_DATABASE_URL=postgres://localhost/user_form_test \
//!     cargo test -p user-form-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `users_api` - HTTP contract of the axum router
//! - `functions` - Framework and raw function adapters
//! - `schema_init` - One-time schema setup and failure handling
//! - `postgres` - `PgUserStore` against a live database

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;
use user_form_api::db::{MemoryUserStore, RepositoryError, UserStore};
use user_form_api::models::{NewUser, User};
use user_form_api::routes;
use user_form_api::state::AppState;
use user_form_core::UserId;

/// Base path used by the server-shaped test app.
pub const API_BASE: &str = "/api";

/// Base path used by the function adapters.
pub const FUNCTION_BASE: &str = "/.netlify/functions/api";

/// The persistent-server router over an in-memory store.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryUserStore>,
}

impl TestApp {
    /// Server app mounted at [`API_BASE`].
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(MemoryUserStore::new());
        let state = AppState::new(store.clone(), API_BASE);
        Self {
            router: routes::server_app(state),
            store,
        }
    }

    /// Send a request, optionally with a JSON body.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        send(&self.router, request).await
    }

    /// Send a fully built request.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        send(&self.router, request).await
    }

    /// `POST /api/users` with the given fields.
    pub async fn create_user(&self, name: &str, mobile: &str, email: &str) -> TestResponse {
        self.request(
            Method::POST,
            "/api/users",
            Some(user_payload(name, mobile, email)),
        )
        .await
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Response with the body already read.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Raw body text.
    pub text: String,
    /// Body parsed as JSON, or `Value::Null` if it is empty or not JSON.
    pub json: Value,
}

impl TestResponse {
    /// The `message` field of the envelope.
    #[must_use]
    pub fn message(&self) -> &str {
        self.json["message"].as_str().unwrap_or_default()
    }

    /// A response header as a string.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// Run one request through `router`.
pub async fn send(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    let text = String::from_utf8_lossy(&bytes).into_owned();
    let json = serde_json::from_str(&text).unwrap_or(Value::Null);

    TestResponse {
        status,
        headers,
        text,
        json,
    }
}

/// JSON body for a create request.
#[must_use]
pub fn user_payload(name: &str, mobile: &str, email: &str) -> Value {
    serde_json::json!({ "name": name, "mobile": mobile, "email": email })
}

/// An email address no other test run will use.
#[must_use]
pub fn unique_email() -> String {
    format!("user-{}@example.com", uuid::Uuid::new_v4().simple())
}

/// Connection string for the live database tests, if configured.
#[must_use]
pub fn test_database_url() -> Option<SecretString> {
    std::env::var("TEST_DATABASE_URL")
        .ok()
        .filter(|url| !url.is_empty())
        .map(SecretString::from)
}

/// Store whose schema setup fails a fixed number of times before
/// delegating to an in-memory store.
#[derive(Debug, Default)]
pub struct FlakySchemaStore {
    failures_left: AtomicUsize,
    attempts: AtomicUsize,
    inner: MemoryUserStore,
}

impl FlakySchemaStore {
    /// Fail the first `failures` schema attempts.
    #[must_use]
    pub fn failing(failures: usize) -> Self {
        Self {
            failures_left: AtomicUsize::new(failures),
            ..Self::default()
        }
    }

    /// Store whose schema setup never succeeds.
    #[must_use]
    pub fn always_failing() -> Self {
        Self::failing(usize::MAX)
    }

    /// Schema attempts so far, successful or not.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserStore for FlakySchemaStore {
    async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        let failed = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failed {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }

        self.inner.ensure_schema().await
    }

    async fn insert_user(&self, user: &NewUser) -> Result<User, RepositoryError> {
        self.inner.insert_user(user).await
    }

    async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        self.inner.list_users().await
    }

    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        self.inner.find_user_by_id(id).await
    }

    async fn delete_user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        self.inner.delete_user_by_id(id).await
    }
}

/// Store whose reads panic, standing in for a driver bug.
#[derive(Debug, Default)]
pub struct PanickingStore {
    inner: MemoryUserStore,
}

/// Panic message raised by [`PanickingStore`].
pub const STORE_PANIC: &str = "connection state corrupted";

#[async_trait]
impl UserStore for PanickingStore {
    async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        self.inner.ensure_schema().await
    }

    async fn insert_user(&self, user: &NewUser) -> Result<User, RepositoryError> {
        self.inner.insert_user(user).await
    }

    async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        panic!("{STORE_PANIC}")
    }

    async fn find_user_by_id(&self, _id: UserId) -> Result<Option<User>, RepositoryError> {
        panic!("{STORE_PANIC}")
    }

    async fn delete_user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        self.inner.delete_user_by_id(id).await
    }
}
