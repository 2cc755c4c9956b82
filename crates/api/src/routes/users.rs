//! `/users` route handlers.
//!
//! Each handler is a thin translation between HTTP and [`UserService`]:
//! extract, call, wrap the result in an [`ApiResponse`].
//!
//! [`UserService`]: crate::services::UserService

use axum::{
    Form, Json,
    extract::{FromRequest, Path, Request, State},
    http::{HeaderMap, StatusCode, header},
};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::models::{ApiResponse, CreateUserRequest, User};
use crate::services::parse_user_id;
use crate::state::AppState;

/// Media type of an HTML form submission.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Body of `POST /users`, decoded by `Content-Type`.
///
/// `application/x-www-form-urlencoded` is read as a form; anything else goes
/// through the JSON extractor, which rejects a missing or non-JSON type.
#[derive(Debug)]
pub struct CreateUserBody(pub CreateUserRequest);

impl<S> FromRequest<S> for CreateUserBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        if is_form(req.headers()) {
            let Form(request) = Form::<CreateUserRequest>::from_request(req, state)
                .await
                .map_err(|rejection| AppError::InvalidBody(rejection.body_text()))?;
            return Ok(Self(request));
        }

        let Json(request) = Json::<CreateUserRequest>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::InvalidBody(rejection.body_text()))?;
        Ok(Self(request))
    }
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}

/// POST /users - Create a user.
#[instrument(skip(state, request))]
pub async fn create(
    State(state): State<AppState>,
    CreateUserBody(request): CreateUserBody,
) -> Result<(StatusCode, Json<ApiResponse<User>>)> {
    let user = state.users().create(request).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::created(user))))
}

/// GET /users - List all users, newest first.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<User>>>> {
    let users = state.users().list().await?;
    Ok(Json(ApiResponse::list(users)))
}

/// GET /users/{id} - Fetch one user.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<User>>> {
    let user = state.users().get(parse_user_id(&id)?).await?;
    Ok(Json(ApiResponse::found(user)))
}

/// DELETE /users/{id} - Delete one user.
#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<User>>> {
    let user = state.users().delete(parse_user_id(&id)?).await?;
    Ok(Json(ApiResponse::deleted(user)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;

    use super::*;

    fn post(content_type: Option<&str>, body: &str) -> Request {
        let mut builder = axum::http::Request::builder().method("POST").uri("/users");
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_form_body_is_decoded() {
        let request = post(
            Some("application/x-www-form-urlencoded; charset=UTF-8"),
            "name=Ada+Lovelace&mobile=9876543210&email=ada%40example.com",
        );

        let CreateUserBody(body) = CreateUserBody::from_request(request, &()).await.unwrap();
        assert_eq!(body.name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(body.mobile.as_deref(), Some("9876543210"));
        assert_eq!(body.email.as_deref(), Some("ada@example.com"));
    }

    #[tokio::test]
    async fn test_json_body_is_decoded() {
        let request = post(Some("application/json"), r#"{"name":"Ada"}"#);

        let CreateUserBody(body) = CreateUserBody::from_request(request, &()).await.unwrap();
        assert_eq!(body.name.as_deref(), Some("Ada"));
        assert!(body.mobile.is_none());
    }

    #[tokio::test]
    async fn test_other_content_types_are_invalid_body() {
        for content_type in [None, Some("text/plain")] {
            let request = post(content_type, r#"{"name":"Ada"}"#);
            let err = CreateUserBody::from_request(request, &()).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidBody(_)), "{content_type:?}");
        }
    }
}
