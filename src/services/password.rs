// src/services/password.rs
//! Password hashing collaborator.
//!
//! The rest of the crate only sees `hash` and `verify`; the digest format
//! stays an implementation detail of this module.

use bcrypt::DEFAULT_COST;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    Ok(bcrypt::hash(password, DEFAULT_COST)?)
}

/// A malformed stored digest reads as a failed check, not an error.
pub fn verify_password(password: &str, digest: &str) -> bool {
    bcrypt::verify(password, digest).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let digest = hash_password("Abc12345!").unwrap();
        assert_ne!(digest, "Abc12345!");
        assert!(verify_password("Abc12345!", &digest));
        assert!(!verify_password("wrong-password", &digest));
    }

    #[test]
    fn test_malformed_digest_fails_check() {
        assert!(!verify_password("Abc12345!", "not-a-bcrypt-digest"));
    }
}
