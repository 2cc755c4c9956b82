//! Serverless host event and response shapes.

use std::collections::BTreeMap;

use axum::http::{StatusCode, header};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::middleware::cors_headers;

/// Incoming function invocation.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionEvent {
    /// HTTP method, e.g. `GET`.
    pub http_method: String,
    /// Full request path, including the host's function prefix.
    pub path: String,
    /// Request headers. Keys are compared case-insensitively.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Raw request body.
    #[serde(default)]
    pub body: Option<String>,
    /// Whether `body` is base64-encoded. Encoded bodies are not supported.
    #[serde(default)]
    pub is_base64_encoded: bool,
}

impl FunctionEvent {
    /// Convenience constructor for an event without headers.
    #[must_use]
    pub fn new(method: &str, path: &str, body: Option<&str>) -> Self {
        Self {
            http_method: method.to_string(),
            path: path.to_string(),
            body: body.map(str::to_string),
            ..Self::default()
        }
    }

    /// Look up a header by name, ignoring case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Function response returned to the host.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

impl FunctionResponse {
    /// `200 OK` with the CORS headers and an empty body.
    #[must_use]
    pub fn preflight() -> Self {
        Self {
            status_code: StatusCode::OK.as_u16(),
            headers: cors_header_map(),
            body: String::new(),
            is_base64_encoded: false,
        }
    }

    /// JSON response with the CORS headers.
    ///
    /// Falls back to a 500 envelope if `body` cannot be serialized.
    #[must_use]
    pub fn json<T: Serialize>(status: StatusCode, body: &T) -> Self {
        match serde_json::to_string(body) {
            Ok(body) => Self {
                status_code: status.as_u16(),
                headers: json_header_map(),
                body,
                is_base64_encoded: false,
            },
            Err(err) => Self::error(&AppError::Internal(err.to_string())),
        }
    }

    /// Error envelope for `err`. Server errors are reported first.
    #[must_use]
    pub fn error(err: &AppError) -> Self {
        err.report();

        Self {
            status_code: err.status().as_u16(),
            headers: json_header_map(),
            body: serde_json::to_string(&err.body())
                .unwrap_or_else(|_| FALLBACK_ERROR_BODY.to_string()),
            is_base64_encoded: false,
        }
    }

    /// Parse the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if the body is not valid JSON.
    pub fn body_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

const FALLBACK_ERROR_BODY: &str = r#"{"success":false,"message":"Something went wrong!"}"#;

fn cors_header_map() -> BTreeMap<String, String> {
    cors_headers()
        .into_iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect()
}

fn json_header_map() -> BTreeMap<String, String> {
    let mut headers = cors_header_map();
    headers.insert(
        header::CONTENT_TYPE.as_str().to_string(),
        "application/json".to_string(),
    );
    headers
}
