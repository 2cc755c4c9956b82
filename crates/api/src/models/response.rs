//! Success envelopes shared by the HTTP routes and the raw function handler.

use serde::Serialize;

use super::User;

/// `{ success: true, message?, count?, data }`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    pub data: T,
}

impl ApiResponse<User> {
    /// Body for `201 Created` after `POST /users`.
    #[must_use]
    pub const fn created(user: User) -> Self {
        Self {
            success: true,
            message: Some("User created successfully"),
            count: None,
            data: user,
        }
    }

    /// Body for `GET /users/:id`.
    #[must_use]
    pub const fn found(user: User) -> Self {
        Self {
            success: true,
            message: None,
            count: None,
            data: user,
        }
    }

    /// Body for `DELETE /users/:id`.
    #[must_use]
    pub const fn deleted(user: User) -> Self {
        Self {
            success: true,
            message: Some("User deleted successfully"),
            count: None,
            data: user,
        }
    }
}

impl ApiResponse<Vec<User>> {
    /// Body for `GET /users`.
    #[must_use]
    pub fn list(users: Vec<User>) -> Self {
        Self {
            success: true,
            message: None,
            count: Some(users.len()),
            data: users,
        }
    }
}

/// Service banner returned from the root path.
#[derive(Debug, Serialize)]
pub struct Banner {
    pub success: bool,
    pub message: &'static str,
    pub status: &'static str,
    pub endpoints: Endpoints,
}

/// Endpoint list advertised by the banner.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoints {
    pub create_user: String,
    pub get_all_users: String,
    pub get_user_by_id: String,
    pub delete_user: String,
}

impl Banner {
    /// Banner listing the user endpoints under `base_path`.
    #[must_use]
    pub fn new(base_path: &str) -> Self {
        Self {
            success: true,
            message: "User Form API is running",
            status: "OK",
            endpoints: Endpoints {
                create_user: format!("POST {base_path}/users"),
                get_all_users: format!("GET {base_path}/users"),
                get_user_by_id: format!("GET {base_path}/users/:id"),
                delete_user: format!("DELETE {base_path}/users/:id"),
            },
        }
    }
}
