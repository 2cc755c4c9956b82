//! User domain types.
//!
//! These types represent validated domain objects separate from database row
//! types and from the raw JSON request body.

use chrono::{DateTime, Utc};
use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use user_form_core::{Email, EmailError, Mobile, MobileError, UserId};

/// A persisted user.
///
/// Serializes with the column names of the `users` table so the JSON shape
/// matches a row: `id`, `name`, `mobile`, `email`, `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// Store-assigned identity.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Ten-digit mobile number.
    pub mobile: Mobile,
    /// Unique email address.
    pub email: Email,
    /// When the row was inserted.
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /users`.
///
/// Every field is optional so a missing field is reported as a validation
/// failure instead of a deserialization failure. Scalars are read as text, so
/// `"mobile": 9876543210` validates like `"mobile": "9876543210"`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default, deserialize_with = "scalar_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub mobile: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub email: Option<String>,
}

/// Read a string, number, or boolean as its text.
///
/// `null`, `false`, and zero count as absent. Arrays and objects are rejected.
fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null | Value::Bool(false)) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(Value::Bool(true)) => Ok(Some("true".to_string())),
        Some(Value::Number(number)) if number.as_f64().is_some_and(|n| n.abs() < f64::EPSILON) => {
            Ok(None)
        }
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(Value::Array(_)) => Err(de::Error::invalid_type(
            Unexpected::Seq,
            &"a string or number",
        )),
        Some(Value::Object(_)) => Err(de::Error::invalid_type(
            Unexpected::Map,
            &"a string or number",
        )),
    }
}

/// Validation failures for [`CreateUserRequest`], in check order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// At least one of `name`, `mobile`, `email` is missing or empty.
    #[error("All fields required")]
    MissingFields,
    /// `mobile` is not exactly ten digits.
    #[error("Mobile must be 10 digits")]
    InvalidMobile,
    /// `email` does not look like `local@domain.tld`.
    #[error("Invalid email")]
    InvalidEmail,
}

impl From<MobileError> for ValidationError {
    fn from(_: MobileError) -> Self {
        Self::InvalidMobile
    }
}

impl From<EmailError> for ValidationError {
    fn from(_: EmailError) -> Self {
        Self::InvalidEmail
    }
}

/// A validated user ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub mobile: Mobile,
    pub email: Email,
}

impl TryFrom<CreateUserRequest> for NewUser {
    type Error = ValidationError;

    /// Validate a create request, stopping at the first failure.
    ///
    /// Presence is checked for all three fields before any format check, so a
    /// request with a bad mobile and a missing name reports the missing field.
    fn try_from(request: CreateUserRequest) -> Result<Self, Self::Error> {
        let (Some(name), Some(mobile), Some(email)) = (
            non_empty(request.name),
            non_empty(request.mobile),
            non_empty(request.email),
        ) else {
            return Err(ValidationError::MissingFields);
        };

        let mobile = Mobile::parse(&mobile)?;
        let email = Email::parse(&email)?;

        Ok(Self {
            name,
            mobile,
            email,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
