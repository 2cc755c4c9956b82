//! Router-free function handler.
//!
//! Matches method and path by hand and calls [`UserService`] directly. Status
//! codes and envelopes are the same as the axum routes produce.

use axum::body::Body;
use axum::extract::FromRequest;
use axum::http::{Method, Request, StatusCode, header};
use tracing::{Instrument, instrument};

use super::event::{FunctionEvent, FunctionResponse};
use crate::error::AppError;
use crate::middleware::panic_message;
use crate::models::{ApiResponse, Banner};
use crate::routes::users::CreateUserBody;
use crate::services::{UserService, parse_user_id};

/// Resolved route for a function event.
#[derive(Debug, PartialEq, Eq)]
enum Route<'a> {
    Preflight,
    Banner,
    ListUsers,
    CreateUser,
    ShowUser(&'a str),
    DeleteUser(&'a str),
    NotFound,
}

impl<'a> Route<'a> {
    fn resolve(method: &Method, path: &'a str) -> Self {
        if method == Method::OPTIONS {
            return Self::Preflight;
        }

        let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

        match (method.as_str(), segments.as_slice()) {
            ("GET", [""]) => Self::Banner,
            ("GET", ["users"]) => Self::ListUsers,
            ("POST", ["users"]) => Self::CreateUser,
            ("GET", ["users", id]) if !id.is_empty() => Self::ShowUser(id),
            ("DELETE", ["users", id]) if !id.is_empty() => Self::DeleteUser(id),
            _ => Self::NotFound,
        }
    }
}

/// Function handler that dispatches without a router.
#[derive(Clone, Debug)]
pub struct RawHandler {
    users: UserService,
    base_path: String,
}

impl RawHandler {
    /// Create a handler serving the user routes under `base_path`.
    #[must_use]
    pub fn new(users: UserService, base_path: impl Into<String>) -> Self {
        Self {
            users,
            base_path: base_path.into(),
        }
    }

    /// Handle one function invocation.
    ///
    /// Never fails: every error becomes a JSON error envelope, and a panic
    /// while dispatching becomes a 500 envelope carrying the panic message.
    #[instrument(skip(self, event), fields(method = %event.http_method, path = %event.path))]
    pub async fn handle(&self, event: FunctionEvent) -> FunctionResponse {
        let handler = self.clone();
        let task = tokio::spawn(async move { handler.dispatch(event).await }.in_current_span());

        match task.await {
            Ok(response) => response,
            Err(err) if err.is_panic() => {
                let detail = panic_message(err.into_panic().as_ref());
                FunctionResponse::error(&AppError::Internal(detail))
            }
            Err(err) => FunctionResponse::error(&AppError::Internal(err.to_string())),
        }
    }

    async fn dispatch(&self, event: FunctionEvent) -> FunctionResponse {
        let Ok(method) = Method::from_bytes(event.http_method.as_bytes()) else {
            return FunctionResponse::error(&AppError::RouteNotFound);
        };

        let path = self.strip_base_path(&event.path);

        let result = match Route::resolve(&method, path) {
            Route::Preflight => return FunctionResponse::preflight(),
            Route::Banner => Ok(FunctionResponse::json(
                StatusCode::OK,
                &Banner::new(&self.base_path),
            )),
            Route::ListUsers => self
                .users
                .list()
                .await
                .map(|users| FunctionResponse::json(StatusCode::OK, &ApiResponse::list(users))),
            Route::CreateUser => self.create(&event).await,
            Route::ShowUser(id) => self.show(id).await,
            Route::DeleteUser(id) => self.destroy(id).await,
            Route::NotFound => Err(AppError::RouteNotFound),
        };

        result.unwrap_or_else(|err| FunctionResponse::error(&err))
    }

    /// Decode the body the way the router does. A missing `Content-Type` is
    /// read as JSON.
    async fn create(&self, event: &FunctionEvent) -> Result<FunctionResponse, AppError> {
        let content_type = event.header("content-type").unwrap_or("application/json");
        let body = Request::builder()
            .method(Method::POST)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(event.body.clone().unwrap_or_default()))
            .map_err(|err| AppError::InvalidBody(err.to_string()))?;
        let CreateUserBody(request) = CreateUserBody::from_request(body, &()).await?;

        let user = self.users.create(request).await?;

        Ok(FunctionResponse::json(StatusCode::CREATED, &ApiResponse::created(user)))
    }

    async fn show(&self, id: &str) -> Result<FunctionResponse, AppError> {
        let user = self.users.get(parse_user_id(id)?).await?;
        Ok(FunctionResponse::json(StatusCode::OK, &ApiResponse::found(user)))
    }

    async fn destroy(&self, id: &str) -> Result<FunctionResponse, AppError> {
        let user = self.users.delete(parse_user_id(id)?).await?;
        Ok(FunctionResponse::json(StatusCode::OK, &ApiResponse::deleted(user)))
    }

    fn strip_base_path<'a>(&self, path: &'a str) -> &'a str {
        if self.base_path.is_empty() {
            return path;
        }

        match path.strip_prefix(self.base_path.as_str()) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
            _ => path,
        }
    }
}
