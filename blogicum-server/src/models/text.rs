//! Free-text field validation: titles and bodies

use super::ValidationError;

/// Maximum length for titles and names
pub const MAX_TITLE_LEN: usize = 256;

/// Maximum length for post and comment bodies (64KB)
const MAX_BODY_LEN: usize = 65536;

/// Validated single-line title (post title, category title, location name)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Title(String);

impl Title {
    /// Create a new title for `field`.
    ///
    /// # Rules
    /// - Non-empty (after trimming whitespace)
    /// - Max 256 characters
    ///
    /// # Example
    /// ```
    /// use blogicum_server::models::Title;
    ///
    /// assert!(Title::new("title", "A day in Kazan").is_ok());
    /// assert!(Title::new("title", "   ").is_err());
    /// ```
    pub fn new(field: &'static str, s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field });
        }

        if trimmed.chars().count() > MAX_TITLE_LEN {
            return Err(ValidationError::TooLong {
                field,
                max: MAX_TITLE_LEN,
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Validated multi-line body (post text, comment text)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body(String);

impl Body {
    /// Create body text for `field`. Blank text is rejected; inner
    /// whitespace and line breaks are kept as written.
    pub fn new(field: &'static str, s: &str) -> Result<Self, ValidationError> {
        if s.trim().is_empty() {
            return Err(ValidationError::Empty { field });
        }

        if s.len() > MAX_BODY_LEN {
            return Err(ValidationError::TooLong {
                field,
                max: MAX_BODY_LEN,
            });
        }

        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Body {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_title() {
        let title = Title::new("title", "  hello  ").unwrap();
        assert_eq!(title.as_str(), "hello");
    }

    #[test]
    fn title_length_counts_characters() {
        // 256 Cyrillic letters are 512 bytes but still a valid title
        assert!(Title::new("title", &"я".repeat(256)).is_ok());

        let err = Title::new("name", &"я".repeat(257)).unwrap_err();
        assert_eq!(err, ValidationError::TooLong { field: "name", max: 256 });
    }

    #[test]
    fn rejects_blank_body() {
        assert_eq!(
            Body::new("text", " \n\t ").unwrap_err(),
            ValidationError::Empty { field: "text" }
        );
    }

    #[test]
    fn body_keeps_formatting() {
        let body = Body::new("text", "  first line\n\nsecond  ").unwrap();
        assert_eq!(body.as_str(), "  first line\n\nsecond  ");
    }

    #[test]
    fn body_max_length() {
        assert!(Body::new("text", &"a".repeat(65536)).is_ok());
        assert!(matches!(
            Body::new("text", &"a".repeat(65537)).unwrap_err(),
            ValidationError::TooLong { .. }
        ));
    }
}
