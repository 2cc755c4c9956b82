//! User Form API library.
//!
//! A users CRUD service over `PostgreSQL`, shared by the persistent server
//! (`user-form-server`) and the serverless function host
//! (`user-form-function`). Both binaries are thin wrappers around
//! [`routes::server_app`], [`functions::FrameworkHandler`], and
//! [`functions::RawHandler`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod functions;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;
