//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. CORS (`tower_http::cors::CorsLayer`, answers browser preflights)
//! 2. `OPTIONS` catch-all (200, empty body)
//! 3. Panic recovery (`CatchPanicLayer` rendering the JSON error envelope)
//! 4. `TraceLayer` (request span with status and latency)
//! 5. Request ID (`x-request-id`)
//!
//! The persistent server additionally wraps the whole router in the Sentry
//! layers.

pub mod cors;
pub mod request_id;

use std::any::Any;

use axum::response::{IntoResponse, Response};

pub use cors::{cors_headers, cors_layer, preflight_middleware};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};

use crate::error::AppError;

/// Turn a handler panic into a 500 JSON envelope.
///
/// Used with `tower_http::catch_panic::CatchPanicLayer::custom`.
#[allow(clippy::needless_pass_by_value)] // signature required by CatchPanicLayer
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    AppError::Internal(panic_message(panic.as_ref())).into_response()
}

/// Text carried by a panic payload, for the `error` field of the envelope.
#[must_use]
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| payload.downcast_ref::<&str>().map(|s| (*s).to_string()))
        .unwrap_or_else(|| "handler panicked".to_string())
}
