/// Structured error types for blogicum-core.
///
/// The CLI wraps these with `anyhow` context; library consumers match on them.
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for configuration handling
#[derive(Error, Debug)]
pub enum CoreError {
    /// I/O operation failed
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Config file exists but is not valid TOML for [`crate::BlogConfig`]
    #[error("Invalid config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Config could not be serialized back to TOML
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value (from file or environment) is unusable
    #[error("Configuration error: {reason}")]
    Config { reason: String },
}

/// Result type alias for blogicum-core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Create a config error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::config("auth.secret is not set");
        assert_eq!(err.to_string(), "Configuration error: auth.secret is not set");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: CoreError = io_err.into();

        assert!(matches!(err, CoreError::Io { .. }));
    }
}
