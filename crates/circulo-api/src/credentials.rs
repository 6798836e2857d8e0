//! Password hashing. Argon2id with the crate's default cost and a fresh
//! random salt per hash; output is a PHC string that embeds both.

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{self, SaltString, rand_core::OsRng},
};

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("password hashing failed: {0}")]
    HashingFailure(password_hash::Error),
    #[error("stored password hash is malformed: {0}")]
    MalformedHash(password_hash::Error),
}

pub fn hash_password(plaintext: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(CredentialError::HashingFailure)?;
    Ok(hash.to_string())
}

/// `Ok(false)` on a wrong password. Errors are reserved for hashes that cannot
/// be parsed or a failing primitive.
pub fn verify_password(plaintext: &str, stored_hash: &str) -> Result<bool, CredentialError> {
    let parsed = PasswordHash::new(stored_hash).map_err(CredentialError::MalformedHash)?;

    match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(CredentialError::HashingFailure(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("secret123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("secret123", &hash).unwrap());
    }

    #[test]
    fn wrong_password_is_a_mismatch_not_an_error() {
        let hash = hash_password("secret123").unwrap();
        assert!(!verify_password("secret124", &hash).unwrap());
        assert!(!verify_password("", &hash).unwrap());
    }

    #[test]
    fn same_password_gets_different_salts() {
        let a = hash_password("secret123").unwrap();
        let b = hash_password("secret123").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("secret123", &b).unwrap());
    }

    #[test]
    fn hash_never_contains_plaintext() {
        let hash = hash_password("plaintext-marker").unwrap();
        assert!(!hash.contains("plaintext-marker"));
    }

    #[test]
    fn malformed_stored_hash() {
        assert!(matches!(
            verify_password("secret123", "not-a-phc-string"),
            Err(CredentialError::MalformedHash(_))
        ));
    }
}
