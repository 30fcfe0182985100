//! Argon2id password hashing and verification.
//!
//! Hashes are PHC strings embedding the algorithm parameters and a fresh
//! random salt, so two hashes of the same plaintext differ while both
//! verify. Verification recomputes with the embedded parameters and relies
//! on `argon2`'s constant-time digest comparison.

use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;

use crate::auth::error::HashError;

/// Hash a plaintext password with Argon2id and a random salt.
///
/// The plaintext may be empty; length policy belongs to the caller.
///
/// # Errors
///
/// Returns [`HashError::Hash`] if the hashing primitive fails.
pub fn hash(plaintext: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);
    let hashed = Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|_| HashError::Hash)?;
    Ok(hashed.to_string())
}

/// Verify a plaintext password against a stored PHC string.
///
/// A mismatch is `Ok(false)`, never an error.
///
/// # Errors
///
/// Returns [`HashError::Malformed`] only when `password_hash` is not a
/// PHC string this crate could have produced.
pub fn verify(plaintext: &str, password_hash: &str) -> Result<bool, HashError> {
    let parsed = PasswordHash::new(password_hash).map_err(|_| HashError::Malformed)?;
    match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(_) => Err(HashError::Malformed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trips() -> Result<(), HashError> {
        let phc = hash("ogni-giorno-alle-sette")?;
        assert!(phc.starts_with("$argon2"));
        assert!(verify("ogni-giorno-alle-sette", &phc)?);
        Ok(())
    }

    #[test]
    fn mismatch_is_false_not_error() -> Result<(), HashError> {
        let phc = hash("morning-run.2024")?;
        assert!(!verify("morning-run.2025", &phc)?);
        Ok(())
    }

    #[test]
    fn salts_are_fresh() -> Result<(), HashError> {
        let plaintext = "ripetuto due volte";
        let first = hash(plaintext)?;
        let second = hash(plaintext)?;
        assert_ne!(first, second);
        assert!(verify(plaintext, &first)?);
        assert!(verify(plaintext, &second)?);
        Ok(())
    }

    #[test]
    fn empty_plaintext_is_allowed() -> Result<(), HashError> {
        let phc = hash("")?;
        assert!(verify("", &phc)?);
        assert!(!verify("x", &phc)?);
        Ok(())
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert_eq!(
            verify("password", "not-a-phc-string"),
            Err(HashError::Malformed)
        );
    }
}
