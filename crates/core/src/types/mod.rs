//! Core types for the User Form API.
//!
//! This module provides type-safe wrappers for the user resource's fields.

pub mod email;
pub mod id;
pub mod mobile;

pub use email::{Email, EmailError};
pub use id::*;
pub use mobile::{Mobile, MobileError};
