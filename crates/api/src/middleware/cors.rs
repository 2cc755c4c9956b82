//! CORS policy and preflight handling.
//!
//! The API is public: any origin may call it with `Content-Type` and the
//! methods below. The raw function handler has no tower stack, so it writes
//! the same headers from [`cors_headers`].

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderName, HeaderValue, Method, StatusCode, header},
    middleware::Next,
    response::Response,
};
use tower_http::cors::{Any, CorsLayer};

/// Methods advertised in `Access-Control-Allow-Methods`.
pub const ALLOWED_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::OPTIONS,
];

/// `Access-Control-Allow-Methods` value for hand-built responses.
const ALLOWED_METHODS_VALUE: &str = "GET, POST, PUT, DELETE, OPTIONS";

/// Build the CORS layer used by the router.
#[must_use]
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(ALLOWED_METHODS)
        .allow_headers([header::CONTENT_TYPE])
}

/// CORS headers for responses that bypass the router.
#[must_use]
pub fn cors_headers() -> [(HeaderName, HeaderValue); 3] {
    [
        (
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ),
        (
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("content-type"),
        ),
        (
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS_VALUE),
        ),
    ]
}

/// Answer every `OPTIONS` request with `200 OK` and an empty body.
///
/// `CorsLayer` only short-circuits requests that look like browser preflights
/// (with `Origin` and `Access-Control-Request-Method`); this catches the rest
/// so that no `OPTIONS` request falls through to a 404 or 405.
pub async fn preflight_middleware(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::OK;
        return response;
    }

    next.run(request).await
}
