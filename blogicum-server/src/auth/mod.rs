//! Authentication primitives: password hashing and session tokens

pub mod password;
pub mod session;

pub use password::{hash_password, reject_unknown_user, verify_password};
pub use session::{Claims, SessionKeys, SESSION_COOKIE};

/// Authentication error type
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("invalid or expired session")]
    InvalidSession,

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("session token could not be issued: {0}")]
    Token(String),
}
