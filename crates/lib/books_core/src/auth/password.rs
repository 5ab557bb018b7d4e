//! Salted password hashing via bcrypt.
//!
//! Each user carries its own random salt. The bcrypt input is
//! `password + salt`; bcrypt adds its own salt on top.

use rand::distr::Alphanumeric;
use rand::{Rng, rng};

use super::AuthError;

/// Length of the per-user salt.
pub const SALT_LEN: usize = 16;

/// bcrypt cost factor used when none is configured.
pub const DEFAULT_BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;

/// Bytes bcrypt reads from its input, excluding the NUL terminator it appends.
const BCRYPT_MAX_INPUT: usize = 71;

/// Longest password, in bytes, that still fits next to the salt.
pub const MAX_PASSWORD_LEN: usize = BCRYPT_MAX_INPUT - SALT_LEN;

/// Random alphanumeric salt from the thread-local CSPRNG.
pub fn generate_salt() -> String {
    rng()
        .sample_iter(&Alphanumeric)
        .take(SALT_LEN)
        .map(char::from)
        .collect()
}

/// Hash `password + salt`. Input bcrypt would truncate is an error.
pub fn hash_password(password: &str, salt: &str, cost: u32) -> Result<String, AuthError> {
    bcrypt::non_truncating_hash(format!("{password}{salt}"), cost)
        .map_err(|e| AuthError::Internal(format!("bcrypt hash: {e}")))
}

/// Check `password + salt` against a stored hash. Input bcrypt would truncate
/// is an error, never a match.
pub fn verify_password(password: &str, salt: &str, hash: &str) -> Result<bool, AuthError> {
    bcrypt::non_truncating_verify(format!("{password}{salt}"), hash)
        .map_err(|e| AuthError::Internal(format!("bcrypt verify: {e}")))
}
