//! Validation error types

use std::fmt;

/// Validation error for domain models and submitted forms
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field is empty when it shouldn't be
    Empty { field: &'static str },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// Field is below minimum length
    TooShort { field: &'static str, min: usize },

    /// String doesn't match required format (e.g., slug)
    InvalidFormat { field: &'static str, reason: &'static str },

    /// The two password fields differ
    PasswordMismatch,

    /// Password rejected by a strength rule
    WeakPassword { reason: &'static str },

    /// Referenced row (category, location) does not exist
    UnknownReference { field: &'static str },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
            Self::TooShort { field, min } => {
                write!(f, "{} must be at least {} characters", field, min)
            }
            Self::InvalidFormat { field, reason } => {
                write!(f, "{}: {}", field, reason)
            }
            Self::PasswordMismatch => write!(f, "the two password fields didn't match"),
            Self::WeakPassword { reason } => write!(f, "password {}", reason),
            Self::UnknownReference { field } => {
                write!(f, "{}: select a valid choice", field)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::TooLong {
            field: "title",
            max: 256,
        };
        assert_eq!(
            err.to_string(),
            "title exceeds maximum length of 256 characters"
        );
        assert_eq!(
            ValidationError::UnknownReference { field: "category_id" }.to_string(),
            "category_id: select a valid choice"
        );
    }
}
