//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /                        - Service banner + endpoint list
//! GET    {base}                   - Same banner, under the deployment prefix
//! GET    /health                  - Liveness (persistent server only)
//! GET    /health/ready            - Readiness (persistent server only)
//!
//! # Users ({base} is /api for the server, /.netlify/functions/api for functions)
//! POST   {base}/users             - Create user
//! GET    {base}/users             - List users, newest first
//! GET    {base}/users/{id}        - Get user
//! DELETE {base}/users/{id}        - Delete user
//!
//! OPTIONS *                       - 200, empty body
//! anything else                   - 404 "Route not found"
//! ```

pub mod home;
pub mod users;

use std::time::Duration;

use axum::{
    Router,
    http::{Request, Response},
    middleware::from_fn,
    routing::get,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::error::AppError;
use crate::middleware::{cors_layer, panic_response, preflight_middleware, request_id_middleware};
use crate::state::AppState;

/// Create the `/users` routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(users::index).post(users::create))
        .route("/users/{id}", get(users::show).delete(users::destroy))
}

/// Create the banner and user routes, with the user routes under `base_path`.
///
/// `base_path` must already be normalized (see
/// [`normalize_base_path`](crate::config::normalize_base_path)).
pub fn routes(base_path: &str) -> Router<AppState> {
    let router = Router::new().route("/", get(home::banner));

    if base_path.is_empty() {
        return router.merge(user_routes());
    }

    router
        .route(base_path, get(home::banner))
        .route(&format!("{base_path}/"), get(home::banner))
        .nest(base_path, user_routes())
}

/// Fallback for unmatched paths and unmatched methods on known paths.
pub async fn route_not_found() -> AppError {
    AppError::RouteNotFound
}

/// Liveness and readiness probes for the persistent server.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(home::health))
        .route("/health/ready", get(home::readiness))
}

/// Build the application used by the function adapters: user routes,
/// fallbacks, and the shared middleware stack.
pub fn app(state: AppState) -> Router {
    let router = routes(state.base_path());
    with_middleware(router, state)
}

/// Build the persistent server application: [`app`] plus the health probes.
pub fn server_app(state: AppState) -> Router {
    let router = routes(state.base_path()).merge(health_routes());
    with_middleware(router, state)
}

fn with_middleware(router: Router<AppState>, state: AppState) -> Router {
    router
        .fallback(route_not_found)
        .method_not_allowed_fallback(route_not_found)
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(from_fn(preflight_middleware))
        .layer(cors_layer())
        .with_state(state)
}
