//! Service banner and health checks.

use axum::{Json, extract::State, http::StatusCode};

use crate::models::Banner;
use crate::state::AppState;

/// GET / - Service banner with the endpoint list.
pub async fn banner(State(state): State<AppState>) -> Json<Banner> {
    Json(Banner::new(state.base_path()))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Ready once the `users` table exists. Returns 503 Service Unavailable if
/// the database cannot be reached or the schema cannot be created.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.users().ensure_schema().await {
        Ok(()) => StatusCode::OK,
        Err(err) => {
            tracing::warn!(error = %err, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
