//! Serverless function adapters.
//!
//! Both adapters accept the host's JSON event (`httpMethod`, `path`,
//! `headers`, `body`) and return its response shape (`statusCode`,
//! `headers`, `body`). They share [`UserService`] and differ only in how they
//! route:
//!
//! - [`FrameworkHandler`] converts the event to an `http::Request` and drives
//!   the same axum router the persistent server uses.
//! - [`RawHandler`] matches method and path by hand, without a router.
//!
//! Neither adapter lets a schema-initialization failure escape: it becomes a
//! 500 response for the request that triggered it, and the next request
//! retries.
//!
//! [`UserService`]: crate::services::UserService

pub mod event;
pub mod framework;
pub mod raw;

pub use event::{FunctionEvent, FunctionResponse};
pub use framework::FrameworkHandler;
pub use raw::RawHandler;
