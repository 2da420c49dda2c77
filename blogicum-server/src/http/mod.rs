//! HTTP layer
//!
//! Axum server with:
//! - CORS (localhost only by default)
//! - Request tracing
//! - Session extractors (cookie or bearer token)
//! - JSON error responses
//! - Graceful shutdown

pub mod server;
pub mod error;
pub mod extractors;
pub mod routes;

pub use server::{build_router, run_server, AppState, MediaSettings, ServerConfig, ServerError};
pub use error::ApiError;
