//! Function handler backed by the axum router.
//!
//! Every invocation is converted to an `http::Request` and run through the
//! same [`app`](crate::routes::app) the persistent server uses, so routing,
//! CORS, and error envelopes cannot drift between deployments.

use std::collections::BTreeMap;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderName, HeaderValue, Request, Response},
};
use tower::ServiceExt;
use tracing::instrument;

use super::event::{FunctionEvent, FunctionResponse};
use crate::error::AppError;
use crate::routes;
use crate::state::AppState;

/// Responses larger than this are treated as a server error.
const MAX_RESPONSE_BYTES: usize = 8 * 1024 * 1024;

/// Function handler that delegates to the axum router.
#[derive(Clone, Debug)]
pub struct FrameworkHandler {
    router: Router,
}

impl FrameworkHandler {
    /// Build the router for `state`.
    #[must_use]
    pub fn new(state: AppState) -> Self {
        Self {
            router: routes::app(state),
        }
    }

    /// Handle one function invocation.
    #[instrument(skip(self, event), fields(method = %event.http_method, path = %event.path))]
    pub async fn handle(&self, event: FunctionEvent) -> FunctionResponse {
        let request = match into_request(event) {
            Ok(request) => request,
            Err(err) => return FunctionResponse::error(&err),
        };

        let response = match self.router.clone().oneshot(request).await {
            Ok(response) => response,
            Err(infallible) => match infallible {},
        };

        from_response(response)
            .await
            .unwrap_or_else(|err| FunctionResponse::error(&err))
    }
}

/// An event whose method or path cannot form a request has no route.
fn into_request(event: FunctionEvent) -> Result<Request<Body>, AppError> {
    let mut builder = Request::builder()
        .method(event.http_method.as_str())
        .uri(event.path.as_str());

    for (name, value) in &event.headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => builder = builder.header(name, value),
            _ => tracing::debug!(header = %name, "Dropping invalid header"),
        }
    }

    builder
        .body(Body::from(event.body.unwrap_or_default()))
        .map_err(|err| {
            tracing::debug!(error = %err, "Event is not a valid request");
            AppError::RouteNotFound
        })
}

async fn from_response(response: Response<Body>) -> Result<FunctionResponse, AppError> {
    let (parts, body) = response.into_parts();

    let mut headers: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in &parts.headers {
        let Ok(value) = value.to_str() else {
            continue;
        };
        headers
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }

    let bytes = to_bytes(body, MAX_RESPONSE_BYTES)
        .await
        .map_err(|err| AppError::Internal(err.to_string()))?;

    Ok(FunctionResponse {
        status_code: parts.status.as_u16(),
        headers,
        body: String::from_utf8_lossy(&bytes).into_owned(),
        is_base64_encoded: false,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::db::MemoryUserStore;

    fn handler() -> FrameworkHandler {
        FrameworkHandler::new(AppState::new(
            Arc::new(MemoryUserStore::new()),
            "/.netlify/functions/api",
        ))
    }

    #[test]
    fn test_into_request_skips_invalid_headers() {
        let mut event = FunctionEvent::new("GET", "/users", None);
        event.headers.insert("bad header".into(), "x".into());
        event.headers.insert("x-request-id".into(), "abc".into());

        let request = into_request(event).unwrap();
        assert_eq!(request.headers().len(), 1);
        assert_eq!(request.headers()["x-request-id"], "abc");
    }

    #[test]
    fn test_into_request_rejects_bad_uri() {
        let event = FunctionEvent::new("GET", "not a path", None);
        assert!(matches!(into_request(event), Err(AppError::RouteNotFound)));
    }

    #[tokio::test]
    async fn test_unusable_path_is_route_not_found() {
        for event in [
            FunctionEvent::new("GET", "not a path", None),
            FunctionEvent::new("GE T", "/.netlify/functions/api/users", None),
        ] {
            let response = handler().handle(event).await;

            assert_eq!(response.status_code, 404);
            assert_eq!(response.body_json().unwrap()["message"], "Route not found");
        }
    }

    #[tokio::test]
    async fn test_banner_under_function_base_path() {
        let response = handler()
            .handle(FunctionEvent::new("GET", "/.netlify/functions/api", None))
            .await;

        assert_eq!(response.status_code, 200);
        let json = response.body_json().unwrap();
        assert_eq!(
            json["endpoints"]["getAllUsers"],
            "GET /.netlify/functions/api/users"
        );
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = handler()
            .handle(FunctionEvent::new("GET", "/.netlify/functions/api/nope", None))
            .await;

        assert_eq!(response.status_code, 404);
        assert_eq!(response.body_json().unwrap()["message"], "Route not found");
    }
}
