//! Password hashing (Argon2id, PHC string format).
//!
//! Work factor is fixed: m = 19 MiB, t = 2, p = 1. Verification reads the
//! parameters embedded in the stored hash, so raising these later keeps old
//! hashes verifiable.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        Error as PhcError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        rand_core::OsRng,
    },
};
use thiserror::Error;

const MEMORY_COST_KIB: u32 = 19_456;
const TIME_COST: u32 = 2;
const PARALLELISM: u32 = 1;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("empty password")]
    EmptyInput,

    #[error("password mismatch")]
    Mismatch,

    #[error("malformed stored hash: {0}")]
    MalformedHash(String),

    #[error("password hashing failed: {0}")]
    Hashing(String),
}

fn hasher() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, None)
        .map_err(|e| PasswordError::Hashing(e.to_string()))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a password with a fresh random salt.
///
/// Two calls with the same input return different strings.
pub fn hash(password: &str) -> Result<String, PasswordError> {
    if password.is_empty() {
        return Err(PasswordError::EmptyInput);
    }

    let salt = SaltString::generate(&mut OsRng);
    let hashed = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hashing(e.to_string()))?
        .to_string();

    Ok(hashed)
}

/// Check `candidate` against a stored hash.
///
/// A wrong password is `Mismatch`; only an unparsable stored hash is `MalformedHash`.
pub fn verify(hashed: &str, candidate: &str) -> Result<(), PasswordError> {
    let parsed =
        PasswordHash::new(hashed).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;

    match hasher()?.verify_password(candidate.as_bytes(), &parsed) {
        Ok(()) => Ok(()),
        Err(PhcError::Password) => Err(PasswordError::Mismatch),
        Err(e) => Err(PasswordError::MalformedHash(e.to_string())),
    }
}
