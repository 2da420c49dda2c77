/// Password hashing and verification using Argon2id
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use once_cell::sync::Lazy;

use super::AuthError;
use crate::models::NewPassword;

/// Hash of a throwaway password, so a login for an unknown username costs
/// as much as one for a real account.
static DUMMY_HASH: Lazy<Option<String>> = Lazy::new(|| {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(b"blogicum-no-such-user", &salt)
        .map(|hash| hash.to_string())
        .ok()
});

/// Hash a validated password.
/// Returns the PHC string suitable for storage in the `users` table.
pub fn hash_password(password: &NewPassword) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_str().as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Verify a password against a stored hash
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AuthError::Hashing(format!("stored hash: {e}")))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Spend one verification on the dummy hash, then reject.
pub fn reject_unknown_user(password: &str) -> Result<(), AuthError> {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
    Err(AuthError::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pw(s: &str) -> NewPassword {
        NewPassword::new(s, s, "someone").unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password(&pw("SecurePass123!")).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("SecurePass123!", &hash).is_ok());
    }

    #[test]
    fn test_wrong_password() {
        let hash = hash_password(&pw("SecurePass123!")).unwrap();
        assert!(matches!(
            verify_password("WrongPass123!", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_salts_differ() {
        let a = hash_password(&pw("SecurePass123!")).unwrap();
        let b = hash_password(&pw("SecurePass123!")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_corrupt_hash() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::Hashing(_))
        ));
    }

    #[test]
    fn test_unknown_user_still_verifies() {
        assert!(DUMMY_HASH.as_deref().is_some_and(|h| h.starts_with("$argon2id$")));
        assert!(matches!(
            reject_unknown_user("anything"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            reject_unknown_user("blogicum-no-such-user"),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
