//! Domain models and response envelopes for the user resource.

pub mod response;
pub mod user;

pub use response::{ApiResponse, Banner};
pub use user::{CreateUserRequest, NewUser, User, ValidationError};
