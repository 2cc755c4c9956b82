//! Function adapter tests.
//!
//! Every scenario runs against both the router-backed and the raw handler,
//! which must agree on status codes and envelopes.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use user_form_api::db::{MemoryUserStore, UserStore};
use user_form_api::functions::{FrameworkHandler, FunctionEvent, FunctionResponse, RawHandler};
use user_form_api::state::AppState;
use user_form_integration_tests::{
    FUNCTION_BASE, FlakySchemaStore, PanickingStore, STORE_PANIC, user_payload,
};

/// Either adapter, built over the same kind of state.
enum Adapter {
    Framework(FrameworkHandler),
    Raw(RawHandler),
}

impl Adapter {
    fn both(store: impl Fn() -> Arc<dyn UserStore>) -> [(&'static str, Self); 2] {
        let framework = AppState::new(store(), FUNCTION_BASE);
        let raw = AppState::new(store(), FUNCTION_BASE);
        [
            ("framework", Self::Framework(FrameworkHandler::new(framework))),
            (
                "raw",
                Self::Raw(RawHandler::new(raw.users().clone(), raw.base_path())),
            ),
        ]
    }

    fn in_memory() -> [(&'static str, Self); 2] {
        Self::both(|| Arc::new(MemoryUserStore::new()))
    }

    async fn handle(&self, event: FunctionEvent) -> FunctionResponse {
        match self {
            Self::Framework(handler) => handler.handle(event).await,
            Self::Raw(handler) => handler.handle(event).await,
        }
    }

    async fn call(&self, method: &str, path: &str, body: Option<&str>) -> FunctionResponse {
        let mut event = FunctionEvent::new(method, &format!("{FUNCTION_BASE}{path}"), body);
        event
            .headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        self.handle(event).await
    }
}

fn create_body(name: &str, mobile: &str, email: &str) -> String {
    user_payload(name, mobile, email).to_string()
}

// =============================================================================
// CRUD Lifecycle
// =============================================================================

#[tokio::test]
async fn test_crud_lifecycle() {
    for (name, adapter) in Adapter::in_memory() {
        let created = adapter
            .call(
                "POST",
                "/users",
                Some(&create_body("Ada", "9876543210", "ada@example.com")),
            )
            .await;
        assert_eq!(created.status_code, 201, "{name}");
        let created = created.body_json().unwrap();
        assert_eq!(created["message"], "User created successfully", "{name}");
        let id = created["data"]["id"].as_i64().unwrap();

        let listed = adapter.call("GET", "/users", None).await;
        assert_eq!(listed.status_code, 200, "{name}");
        assert_eq!(listed.body_json().unwrap()["count"], 1, "{name}");

        let fetched = adapter.call("GET", &format!("/users/{id}"), None).await;
        assert_eq!(fetched.status_code, 200, "{name}");
        assert_eq!(
            fetched.body_json().unwrap()["data"],
            created["data"],
            "{name}"
        );

        let deleted = adapter.call("DELETE", &format!("/users/{id}"), None).await;
        assert_eq!(deleted.status_code, 200, "{name}");
        assert_eq!(
            deleted.body_json().unwrap()["message"],
            "User deleted successfully",
            "{name}"
        );

        let gone = adapter.call("GET", &format!("/users/{id}"), None).await;
        assert_eq!(gone.status_code, 404, "{name}");
        assert_eq!(gone.body_json().unwrap()["message"], "User not found", "{name}");
    }
}

#[tokio::test]
async fn test_validation_and_conflict() {
    for (name, adapter) in Adapter::in_memory() {
        let missing = adapter
            .call("POST", "/users", Some(r#"{"name":"Ada"}"#))
            .await;
        assert_eq!(missing.status_code, 400, "{name}");
        assert_eq!(
            missing.body_json().unwrap()["message"],
            "All fields required",
            "{name}"
        );

        let bad_mobile = adapter
            .call(
                "POST",
                "/users",
                Some(&create_body("Ada", "12345", "ada@example.com")),
            )
            .await;
        assert_eq!(
            bad_mobile.body_json().unwrap()["message"],
            "Mobile must be 10 digits",
            "{name}"
        );

        let body = create_body("Ada", "9876543210", "ada@example.com");
        adapter.call("POST", "/users", Some(&body)).await;
        let duplicate = adapter.call("POST", "/users", Some(&body)).await;
        assert_eq!(duplicate.status_code, 409, "{name}");
        assert_eq!(
            duplicate.body_json().unwrap()["message"],
            "Email already exists",
            "{name}"
        );
    }
}

#[tokio::test]
async fn test_form_and_numeric_bodies_create_users() {
    for (name, adapter) in Adapter::in_memory() {
        let mut event = FunctionEvent::new(
            "POST",
            &format!("{FUNCTION_BASE}/users"),
            Some("name=Ada+Lovelace&mobile=9876543210&email=ada%40example.com"),
        );
        event.headers.insert(
            "Content-Type".to_string(),
            "application/x-www-form-urlencoded".to_string(),
        );
        let form = adapter.handle(event).await;
        assert_eq!(form.status_code, 201, "{name}");
        let form = form.body_json().unwrap();
        assert_eq!(form["data"]["name"], "Ada Lovelace", "{name}");
        assert_eq!(form["data"]["email"], "ada@example.com", "{name}");

        let numeric = adapter
            .call(
                "POST",
                "/users",
                Some(r#"{"name":"Bob","mobile":9123456789,"email":"bob@example.com"}"#),
            )
            .await;
        assert_eq!(numeric.status_code, 201, "{name}");
        assert_eq!(
            numeric.body_json().unwrap()["data"]["mobile"],
            "9123456789",
            "{name}"
        );
    }
}

#[tokio::test]
async fn test_invalid_json_body() {
    for (name, adapter) in Adapter::in_memory() {
        let response = adapter.call("POST", "/users", Some("{ not json")).await;
        assert_eq!(response.status_code, 400, "{name}");
        assert_eq!(
            response.body_json().unwrap()["message"],
            "Invalid request body",
            "{name}"
        );
    }
}

// =============================================================================
// Routing
// =============================================================================

#[tokio::test]
async fn test_banner_lists_function_paths() {
    for (name, adapter) in Adapter::in_memory() {
        let response = adapter.call("GET", "", None).await;
        assert_eq!(response.status_code, 200, "{name}");
        assert_eq!(
            response.body_json().unwrap()["endpoints"]["deleteUser"],
            "DELETE /.netlify/functions/api/users/:id",
            "{name}"
        );
    }
}

#[tokio::test]
async fn test_options_short_circuits() {
    for (name, adapter) in Adapter::in_memory() {
        let response = adapter.call("OPTIONS", "/users/1", None).await;
        assert_eq!(response.status_code, 200, "{name}");
        assert!(response.body.is_empty(), "{name}");
    }
}

#[tokio::test]
async fn test_unknown_route_and_method() {
    for (name, adapter) in Adapter::in_memory() {
        for (method, path) in [("GET", "/nope"), ("PUT", "/users/1"), ("GET", "/users/1/x")] {
            let response = adapter.call(method, path, None).await;
            assert_eq!(response.status_code, 404, "{name} {method} {path}");
            assert_eq!(
                response.body_json().unwrap()["message"],
                "Route not found",
                "{name} {method} {path}"
            );
        }
    }
}

#[tokio::test]
async fn test_non_numeric_id_is_user_not_found() {
    for (name, adapter) in Adapter::in_memory() {
        let response = adapter.call("DELETE", "/users/abc", None).await;
        assert_eq!(response.status_code, 404, "{name}");
        assert_eq!(
            response.body_json().unwrap()["message"],
            "User not found",
            "{name}"
        );
    }
}

#[tokio::test]
async fn test_raw_responses_carry_cors_and_content_type() {
    let store: Arc<dyn UserStore> = Arc::new(MemoryUserStore::new());
    let state = AppState::new(store, FUNCTION_BASE);
    let handler = RawHandler::new(state.users().clone(), state.base_path());

    let response = handler
        .handle(FunctionEvent::new(
            "GET",
            "/.netlify/functions/api/users",
            None,
        ))
        .await;

    let header = |key: &str| response.headers.get(key).map(String::as_str);
    assert_eq!(header("access-control-allow-origin"), Some("*"));
    assert_eq!(header("access-control-allow-headers"), Some("content-type"));
    assert_eq!(
        header("access-control-allow-methods"),
        Some("GET, POST, PUT, DELETE, OPTIONS")
    );
    assert_eq!(header("content-type"), Some("application/json"));
}

// =============================================================================
// Initialization Failure
// =============================================================================

#[tokio::test]
async fn test_schema_failure_is_500() {
    for (name, adapter) in Adapter::both(|| Arc::new(FlakySchemaStore::always_failing())) {
        let response = adapter.call("GET", "/users", None).await;
        assert_eq!(response.status_code, 500, "{name}");

        let json = response.body_json().unwrap();
        assert_eq!(json["success"], false, "{name}");
        assert_eq!(json["message"], "Error initializing database", "{name}");
        assert!(json["error"].is_string(), "{name}");
    }
}

#[tokio::test]
async fn test_store_panic_is_500_envelope() {
    for (name, adapter) in Adapter::both(|| Arc::new(PanickingStore::default())) {
        for path in ["/users", "/users/1"] {
            let response = adapter.call("GET", path, None).await;
            assert_eq!(response.status_code, 500, "{name} {path}");

            let json = response.body_json().unwrap();
            assert_eq!(json["success"], false, "{name} {path}");
            assert_eq!(json["message"], "Something went wrong!", "{name} {path}");
            assert_eq!(json["error"], STORE_PANIC, "{name} {path}");
        }

        // The handler keeps serving after a panic.
        let banner = adapter.call("GET", "", None).await;
        assert_eq!(banner.status_code, 200, "{name}");
    }
}

#[tokio::test]
async fn test_schema_failure_is_retried() {
    for (name, adapter) in Adapter::both(|| Arc::new(FlakySchemaStore::failing(1))) {
        let first = adapter.call("GET", "/users", None).await;
        assert_eq!(first.status_code, 500, "{name}");

        let second = adapter.call("GET", "/users", None).await;
        assert_eq!(second.status_code, 200, "{name}");
    }
}
