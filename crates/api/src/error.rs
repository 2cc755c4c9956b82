//! Unified error handling with Sentry integration.
//!
//! Every failure leaves the service as a JSON envelope:
//!
//! ```json
//! { "success": false, "message": "Error creating user", "error": "database error: ..." }
//! ```
//!
//! `error` is only present on 500 responses. Route handlers return
//! `Result<T, AppError>`; the serverless raw handler renders the same
//! envelope through [`AppError::status`] and [`AppError::body`].

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::ValidationError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Create request failed validation.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Request body could not be decoded.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Email is already registered.
    #[error("Email already exists")]
    Conflict,

    /// No user with the requested ID.
    #[error("User not found")]
    NotFound,

    /// Store failed while performing `action`.
    #[error("Error {action}: {source}")]
    Store {
        action: &'static str,
        #[source]
        source: RepositoryError,
    },

    /// No route for this method and path.
    #[error("Route not found")]
    RouteNotFound,

    /// Unexpected failure outside the store (e.g. a panic in a handler).
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error envelope written to the response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AppError {
    /// Wrap a store failure with the action that was being attempted.
    ///
    /// `action` reads as a gerund phrase, e.g. `"creating user"`.
    #[must_use]
    pub const fn store(action: &'static str, source: RepositoryError) -> Self {
        Self::Store { action, source }
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::Conflict => StatusCode::CONFLICT,
            Self::NotFound | Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::Store { .. } | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Response envelope for this error.
    ///
    /// Client errors carry only a message. Server errors also carry the
    /// underlying error text in `error`.
    #[must_use]
    pub fn body(&self) -> ErrorBody {
        let (message, error) = match self {
            Self::Validation(err) => (err.to_string(), None),
            Self::InvalidBody(_) => ("Invalid request body".to_string(), None),
            Self::Conflict | Self::NotFound | Self::RouteNotFound => (self.to_string(), None),
            Self::Store { action, source } => {
                (capitalize(&format!("error {action}")), Some(source.to_string()))
            }
            Self::Internal(detail) => ("Something went wrong!".to_string(), Some(detail.clone())),
        };

        ErrorBody {
            success: false,
            message,
            error,
        }
    }

    /// Log server errors and report them to Sentry.
    ///
    /// A no-op for client errors.
    pub fn report(&self) {
        if self.status().is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = %self.status(), "Request rejected");
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.report();
        (self.status(), Json(self.body())).into_response()
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
