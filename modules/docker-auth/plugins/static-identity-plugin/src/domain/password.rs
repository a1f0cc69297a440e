//! Argon2 password hashes in PHC string format.

use std::sync::LazyLock;

use argon2::password_hash::{PasswordHashString, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use crate::domain::error::HashError;

/// Verified against when the user is unknown, so that lookups of unknown and
/// known users cost the same.
static UNKNOWN_USER_HASH: LazyLock<Option<PasswordHashString>> = LazyLock::new(|| {
    let salt = SaltString::from_b64("dW5rbm93bi11c2VyLXNhbHQ").ok()?;
    Argon2::default()
        .hash_password(b"", &salt)
        .ok()
        .map(|hash| hash.serialize())
});

/// Hash `password` with Argon2id (default parameters) and a random salt.
///
/// # Errors
///
/// Fails when the OS has no randomness for the salt or hashing fails.
pub fn hash_password(password: &str) -> Result<String, HashError> {
    let mut salt = [0u8; 16];
    getrandom::getrandom(&mut salt).map_err(HashError::Salt)?;
    let salt = SaltString::encode_b64(&salt).map_err(HashError::Argon2)?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(HashError::Argon2)
}

/// Parse a configured PHC string. Only Argon2 hashes with an output are accepted.
#[must_use]
pub fn parse(phc: &str) -> Option<PasswordHashString> {
    let hash = PasswordHash::new(phc.trim()).ok()?;
    argon2::Algorithm::try_from(hash.algorithm).ok()?;
    hash.hash.as_ref()?;
    Some(hash.serialize())
}

/// Check `password` against `stored`, or against a fixed hash when there is none.
/// Always `false` without a stored hash.
#[must_use]
pub fn verify(password: &str, stored: Option<&PasswordHashString>) -> bool {
    match stored {
        Some(stored) => check(password, stored),
        None => {
            if let Some(dummy) = UNKNOWN_USER_HASH.as_ref() {
                check(password, dummy);
            }
            false
        }
    }
}

fn check(password: &str, stored: &PasswordHashString) -> bool {
    Argon2::default()
        .verify_password(password.as_bytes(), &stored.password_hash())
        .is_ok()
}
