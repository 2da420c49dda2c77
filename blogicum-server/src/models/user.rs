//! Account field validation: username, names, e-mail, new passwords

use once_cell::sync::Lazy;
use regex::Regex;

use super::ValidationError;

const MAX_USERNAME_LEN: usize = 150;
const MAX_NAME_LEN: usize = 150;
const MAX_EMAIL_LEN: usize = 254;
const MIN_PASSWORD_LEN: usize = 8;
const MAX_PASSWORD_LEN: usize = 4096;

/// Letters (any script), digits, and `@ . + - _`
static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("invalid username regex"));

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("invalid email regex"));

/// Validated username
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// # Example
    /// ```
    /// use blogicum_server::models::Username;
    ///
    /// assert!(Username::new("leo.tolstoy").is_ok());
    /// assert!(Username::new("лев_толстой").is_ok());
    /// assert!(Username::new("leo tolstoy").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "username" });
        }

        if trimmed.chars().count() > MAX_USERNAME_LEN {
            return Err(ValidationError::TooLong {
                field: "username",
                max: MAX_USERNAME_LEN,
            });
        }

        if !USERNAME_RE.is_match(trimmed) {
            return Err(ValidationError::InvalidFormat {
                field: "username",
                reason: "may contain only letters, digits and @/./+/-/_ characters",
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

/// First or last name; may be empty
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PersonName(String);

impl PersonName {
    pub fn new(field: &'static str, s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();
        if trimmed.chars().count() > MAX_NAME_LEN {
            return Err(ValidationError::TooLong {
                field,
                max: MAX_NAME_LEN,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// E-mail address; may be empty
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Email(String);

impl Email {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }

        if trimmed.len() > MAX_EMAIL_LEN {
            return Err(ValidationError::TooLong {
                field: "email",
                max: MAX_EMAIL_LEN,
            });
        }

        if !EMAIL_RE.is_match(trimmed) {
            return Err(ValidationError::InvalidFormat {
                field: "email",
                reason: "enter a valid email address",
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A password chosen at registration or password change, checked against
/// its confirmation and the strength rules.
#[derive(Clone, PartialEq, Eq)]
pub struct NewPassword(String);

impl NewPassword {
    /// # Rules
    /// - Both entries match
    /// - At least 8 characters
    /// - Not entirely numeric
    /// - Not the same as the username (case-insensitive)
    pub fn new(password: &str, confirmation: &str, username: &str) -> Result<Self, ValidationError> {
        if password.is_empty() {
            return Err(ValidationError::Empty { field: "password1" });
        }

        if password != confirmation {
            return Err(ValidationError::PasswordMismatch);
        }

        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::TooShort {
                field: "password",
                min: MIN_PASSWORD_LEN,
            });
        }

        if password.len() > MAX_PASSWORD_LEN {
            return Err(ValidationError::TooLong {
                field: "password",
                max: MAX_PASSWORD_LEN,
            });
        }

        if password.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::WeakPassword {
                reason: "is entirely numeric",
            });
        }

        if password.to_lowercase() == username.trim().to_lowercase() {
            return Err(ValidationError::WeakPassword {
                reason: "is too similar to the username",
            });
        }

        Ok(Self(password.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for NewPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("NewPassword(***)")
    }
}
