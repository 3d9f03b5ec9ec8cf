//! Stored account credentials.
//!
//! Only the Argon2 PHC string is ever kept; plain text is checked for
//! length, hashed and dropped.

use std::fmt;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::config::MIN_PASSWORD_LENGTH;
use crate::errors::{AppError, AppResult};

/// Length of the generated credential for phone-only accounts.
const GENERATED_LENGTH: usize = 24;

/// An Argon2 password hash.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

impl Password {
    /// Hash `plain`, rejecting anything shorter than the minimum length.
    pub fn new(plain: &str) -> AppResult<Self> {
        if plain.chars().count() < MIN_PASSWORD_LENGTH as usize {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map(|hash| Self(hash.to_string()))
            .map_err(|e| AppError::internal(format!("Password hash failed: {}", e)))
    }

    /// Wrap a hash loaded from storage.
    pub fn from_hash(hash: String) -> Self {
        Self(hash)
    }

    /// Hash of a random credential nobody knows. Phone-login accounts
    /// get one so the column is never empty.
    pub fn random() -> AppResult<Self> {
        let plain: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(GENERATED_LENGTH)
            .map(char::from)
            .collect();
        Self::new(&plain)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// A malformed stored hash never matches.
    pub fn verify(&self, plain: &str) -> bool {
        match PasswordHash::new(&self.0) {
            Ok(parsed) => Argon2::default()
                .verify_password(plain.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::warn!(error = %e, "Stored password hash is unreadable");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_verifies_only_the_original() {
        let password = Password::new("shop-secret-42").unwrap();

        assert!(password.verify("shop-secret-42"));
        assert!(!password.verify("shop-secret-43"));
    }

    #[test]
    fn test_stored_hash_round_trips() {
        let stored = Password::new("TestPassword123").unwrap().into_string();
        assert!(Password::from_hash(stored).verify("TestPassword123"));
    }

    #[test]
    fn test_salts_differ_per_hash() {
        let a = Password::new("SamePassword123").unwrap();
        let b = Password::new("SamePassword123").unwrap();

        assert_ne!(a, b);
        assert!(a.verify("SamePassword123"));
        assert!(b.verify("SamePassword123"));
    }

    #[test]
    fn test_length_boundary() {
        assert!(Password::new("short").is_err());
        assert!(Password::new("123456").is_ok());
    }

    #[test]
    fn test_garbage_hash_never_matches() {
        assert!(!Password::from_hash("not-a-phc-string".into()).verify("anything"));
    }

    #[test]
    fn test_debug_hides_hash() {
        let password = Password::new("shop-secret-42").unwrap();
        assert_eq!(format!("{:?}", password), "Password(***)");
    }

    #[test]
    fn test_random_credentials_differ() {
        let a = Password::random().unwrap();
        let b = Password::random().unwrap();
        assert_ne!(a.as_str(), b.as_str());
    }
}
