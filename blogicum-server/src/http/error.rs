//! API error types with IntoResponse
//!
//! Errors are converted to JSON responses with appropriate status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::auth::AuthError;
use crate::db::DbError;
use crate::models::ValidationError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Form or path validation failed (400)
    Validation(ValidationError),

    /// Body could not be read as the expected JSON (400)
    BadRequest { message: String },

    /// No session, or bad credentials (401)
    Unauthorized { message: &'static str },

    /// Signed in, but not allowed to touch this resource (403)
    Forbidden { reason: &'static str },

    /// Resource not found (404)
    NotFound { resource: &'static str, id: String },

    /// Unique field already taken (409)
    Conflict { message: String },

    /// Upload over the configured limit (413)
    PayloadTooLarge { max_bytes: usize },

    /// Upload of an unsupported format (415)
    UnsupportedMediaType { content_type: String },

    /// Database error (500, logged)
    Database(DbError),

    /// Internal error (500, logged)
    Internal { message: String },
}

impl ApiError {
    pub fn login_required() -> Self {
        Self::Unauthorized {
            message: "authentication required",
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Database(_) | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = match &self {
            Self::Validation(e) => ("validation_error", e.to_string()),
            Self::BadRequest { message } => ("bad_request", message.clone()),
            Self::Unauthorized { message } => ("unauthorized", (*message).to_owned()),
            Self::Forbidden { reason } => ("forbidden", (*reason).to_owned()),
            Self::NotFound { resource, id } => {
                ("not_found", format!("{} '{}' not found", resource, id))
            }
            Self::Conflict { message } => ("conflict", message.clone()),
            Self::PayloadTooLarge { max_bytes } => (
                "payload_too_large",
                format!("upload exceeds {} bytes", max_bytes),
            ),
            Self::UnsupportedMediaType { content_type } => (
                "unsupported_media_type",
                format!("'{}' is not an accepted image type", content_type),
            ),
            Self::Database(e) => {
                // Log the actual error, return generic message
                tracing::error!("Database error: {}", e);
                ("internal_error", "an internal error occurred".to_owned())
            }
            Self::Internal { message } => {
                tracing::error!("Internal error: {}", message);
                ("internal_error", "an internal error occurred".to_owned())
            }
        };

        (status, Json(json!({ "error": code, "message": message }))).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { resource, id } => Self::NotFound { resource, id },
            DbError::Conflict { .. } => Self::Conflict {
                message: e.to_string(),
            },
            DbError::InvalidReference { field } => {
                Self::Validation(ValidationError::UnknownReference { field })
            }
            DbError::Sqlx(_) => Self::Database(e),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => Self::Unauthorized {
                message: "invalid username or password",
            },
            AuthError::InvalidSession => Self::login_required(),
            AuthError::Hashing(_) | AuthError::Token(_) => Self::internal(e.to_string()),
        }
    }
}
