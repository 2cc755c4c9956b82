//! Business logic shared by every deployment variant.
//!
//! # Services
//!
//! - `schema` - One-time, concurrency-safe table creation per process
//! - `users` - The four user operations (create, list, get, delete)
//!
//! HTTP routes and serverless adapters only translate requests into calls on
//! [`UserService`] and render its results.

pub mod schema;
pub mod users;

pub use schema::SchemaInitializer;
pub use users::{UserService, parse_user_id};
