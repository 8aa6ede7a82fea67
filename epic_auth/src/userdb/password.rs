//! Argon2id password hashing

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use std::sync::LazyLock;

use crate::utils::gen_random_bytes;

use super::errors::UserError;

/// Hash compared against when the account does not exist, so both paths cost one Argon2 run.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("epic-auth-dummy-password").ok());

/// Hash a password into a PHC string with a random salt.
pub fn hash_password(password: &str) -> Result<String, UserError> {
    let salt_bytes = gen_random_bytes(16)?;
    let salt =
        SaltString::encode_b64(&salt_bytes).map_err(|e| UserError::Hashing(e.to_string()))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserError::Hashing(e.to_string()))
}

/// Check a password against a stored PHC string. Malformed hashes never verify.
pub(crate) fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::error!(error = %e, "Stored password hash is malformed");
            false
        }
    }
}

/// Burn one verification for an unknown account. Always returns false.
pub(crate) fn verify_dummy_password(password: &str) -> bool {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
    false
}
