//! blogicum-core: configuration and error types shared by the server and CLI.

pub mod config;
pub mod error;

pub use config::{AuthSection, BlogConfig, DatabaseSection, MediaSection, ServerSection};
pub use error::{CoreError, Result};
