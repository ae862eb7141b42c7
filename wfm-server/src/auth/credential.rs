//! Password hashing and verification
//!
//! Argon2id with a per-password random salt. Digests are stored in PHC
//! string form and never serialized into API responses.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Password is required")]
    Empty,

    #[error("Failed to hash password: {0}")]
    Hash(String),
}

/// Hash a raw password. Empty input is rejected before any hashing.
pub fn hash_password(raw: &str) -> Result<String, CredentialError> {
    if raw.is_empty() {
        return Err(CredentialError::Empty);
    }

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(raw.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CredentialError::Hash(e.to_string()))
}

/// Verify a raw password against a stored digest.
///
/// An empty or unparseable digest never matches; no error surfaces to the
/// caller, a mismatch and a broken digest look identical.
pub fn verify_password(raw: &str, digest: &str) -> bool {
    if digest.is_empty() {
        return false;
    }

    match PasswordHash::new(digest) {
        Ok(parsed) => Argon2::default()
            .verify_password(raw.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_verify_round_trip() {
        let digest = hash_password("s3cret-password").expect("hash");
        assert!(verify_password("s3cret-password", &digest));
        assert!(!verify_password("wrong-password", &digest));
    }

    #[test]
    fn test_empty_password_rejected() {
        assert!(matches!(hash_password(""), Err(CredentialError::Empty)));
    }

    #[test]
    fn test_empty_or_garbage_digest_never_matches() {
        assert!(!verify_password("anything", ""));
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_salted_hashes_differ() {
        let a = hash_password("same-password").expect("hash");
        let b = hash_password("same-password").expect("hash");
        assert_ne!(a, b);
        assert!(verify_password("same-password", &a));
        assert!(verify_password("same-password", &b));
    }
}
