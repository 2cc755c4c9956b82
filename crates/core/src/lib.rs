//! User Form Core - Shared domain types.
//!
//! This crate provides the validated value types used by every User Form
//! component:
//! - `api` - HTTP server and serverless function adapters
//! - `cli` - Command-line tools for schema setup and user management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP.
//! Database encoding is available behind the `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for user IDs, email addresses, and mobile numbers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
