//! Mobile phone number type.

use core::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static MOBILE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("Invalid regex"));

/// Errors that can occur when parsing a [`Mobile`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MobileError {
    /// The input string is empty.
    #[error("empty mobile number")]
    Empty,
    /// The input is not exactly ten ASCII digits.
    #[error("expected exactly {len} ASCII digits", len = Mobile::LENGTH)]
    InvalidFormat,
}

/// A ten-digit mobile number.
///
/// No country code, separators, or whitespace are accepted. The value is
/// stored exactly as given.
///
/// ```
/// use user_form_core::Mobile;
///
/// assert!(Mobile::parse("9876543210").is_ok());
/// assert!(Mobile::parse("12345").is_err());
/// assert!(Mobile::parse("abcdefghij").is_err());
/// assert!(Mobile::parse("123456789012").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Mobile(String);

impl Mobile {
    /// Required number of digits.
    pub const LENGTH: usize = 10;

    /// Parse a `Mobile` from a string.
    ///
    /// # Errors
    ///
    /// Returns [`MobileError::Empty`] for an empty string and
    /// [`MobileError::InvalidFormat`] unless the input is exactly ten digits.
    pub fn parse(s: &str) -> Result<Self, MobileError> {
        if s.is_empty() {
            return Err(MobileError::Empty);
        }

        if !MOBILE_PATTERN.is_match(s) {
            return Err(MobileError::InvalidFormat);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Mobile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Mobile {
    type Err = MobileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Mobile {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Mobile {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
