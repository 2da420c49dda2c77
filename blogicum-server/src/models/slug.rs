//! Category slug validation
//!
//! Slug format: ASCII letters, digits, hyphens and underscores

use once_cell::sync::Lazy;
use regex::Regex;

use super::ValidationError;

/// Maximum length for category slugs
const MAX_SLUG_LEN: usize = 64;

static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("invalid slug regex"));

/// Validated category slug, used in `/category/{slug}` URLs
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CategorySlug(String);

impl CategorySlug {
    /// Create a new slug, validating format.
    ///
    /// # Example
    /// ```
    /// use blogicum_server::models::CategorySlug;
    ///
    /// assert!(CategorySlug::new("travel-2024").is_ok());
    /// assert!(CategorySlug::new("Travel_Notes").is_ok());
    /// assert!(CategorySlug::new("no spaces").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "slug" });
        }

        if s.len() > MAX_SLUG_LEN {
            return Err(ValidationError::TooLong {
                field: "slug",
                max: MAX_SLUG_LEN,
            });
        }

        if !SLUG_RE.is_match(s) {
            return Err(ValidationError::InvalidFormat {
                field: "slug",
                reason: "may contain only latin letters, digits, hyphens and underscores",
            });
        }

        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CategorySlug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_slugs() {
        assert!(CategorySlug::new("travel").is_ok());
        assert!(CategorySlug::new("my_category").is_ok());
        assert!(CategorySlug::new("Mixed-Case-1").is_ok());
        assert!(CategorySlug::new("-leading-dash").is_ok());
    }

    #[test]
    fn rejects_spaces_and_unicode() {
        assert!(matches!(
            CategorySlug::new("two words").unwrap_err(),
            ValidationError::InvalidFormat { .. }
        ));
        assert!(matches!(
            CategorySlug::new("путешествия").unwrap_err(),
            ValidationError::InvalidFormat { .. }
        ));
    }

    #[test]
    fn rejects_empty() {
        assert!(matches!(
            CategorySlug::new("").unwrap_err(),
            ValidationError::Empty { .. }
        ));
    }

    #[test]
    fn max_length() {
        assert!(CategorySlug::new(&"a".repeat(64)).is_ok());
        let err = CategorySlug::new(&"a".repeat(65)).unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { max: 64, .. }));
    }
}
