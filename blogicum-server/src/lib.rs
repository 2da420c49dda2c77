//! blogicum-server: blogging HTTP service
//!
//! Authors publish posts into categories, readers browse feeds ten posts at
//! a time and comment once signed in.

pub mod auth;
pub mod db;
pub mod http;
pub mod models;

pub use http::{build_router, run_server, ApiError, AppState, MediaSettings, ServerConfig};
