//! Password hashing.
//!
//! Argon2id with a random salt per hash. Plaintext passwords exist only on
//! the stack of these two functions and the callers' request structs.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Errors that can occur while hashing or checking passwords.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// Password too short.
    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    TooShort,

    /// Hashing failed (salt generation or parameter error).
    #[error("password hashing failed")]
    Hash,
}

/// Validate and hash a plaintext password.
///
/// # Errors
///
/// Returns `PasswordError::TooShort` when the password is below the minimum
/// length and `PasswordError::Hash` when Argon2 fails.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::TooShort);
    }

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| PasswordError::Hash)
}

/// Check a plaintext password against a stored hash.
///
/// An unparseable stored hash counts as a mismatch rather than an error:
/// from the caller's point of view the credential simply does not verify.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
