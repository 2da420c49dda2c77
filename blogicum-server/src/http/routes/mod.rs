//! Route handlers organized by resource

use axum::http::header::LOCATION;
use axum::http::{HeaderName, HeaderValue};

use super::error::ApiError;

pub mod health;
pub mod posts;
pub mod categories;
pub mod comments;
pub mod profiles;
pub mod auth;

/// `Location` header naming where the client should go next.
pub(crate) fn location(path: &str) -> Result<[(HeaderName, HeaderValue); 1], ApiError> {
    let value = HeaderValue::from_str(path)
        .map_err(|e| ApiError::internal(format!("bad Location '{}': {}", path, e)))?;
    Ok([(LOCATION, value)])
}

/// Profile page path with the username percent-encoded.
pub(crate) fn profile_path(username: &str) -> String {
    format!("/profile/{}", urlencoding::encode(username))
}

pub(crate) fn post_path(post_id: uuid::Uuid) -> String {
    format!("/posts/{}", post_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_path_is_encoded() {
        assert_eq!(profile_path("alice"), "/profile/alice");
        assert_eq!(profile_path("a+b@c"), "/profile/a%2Bb%40c");
    }

    #[test]
    fn location_header() {
        let [(name, value)] = location("/posts/1").unwrap();
        assert_eq!(name, LOCATION);
        assert_eq!(value, "/posts/1");
    }
}
