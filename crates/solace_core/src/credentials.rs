//! Password handling: canonical encoding, Argon2id hashing and verification.
//!
//! A user authenticates with two pieces of text, a secret (password) and a
//! passcode. Both are folded into one byte string before hashing.
//!
//! Records written by older versions carry bcrypt hashes. Those still verify,
//! and [`is_legacy`] tells the caller to rehash after a successful login.

use crate::error::{Result, SolaceError};
use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};

/// Separator placed between secret and passcode.
pub const SEPARATOR: u8 = b':';

/// Argon2 memory cost in KiB.
pub const MEMORY_COST_KIB: u32 = 19 * 1024;

/// Argon2 iteration count.
pub const TIME_COST: u32 = 2;

/// Argon2 degree of parallelism.
pub const PARALLELISM: u32 = 1;

const BCRYPT_PREFIXES: [&str; 4] = ["$2a$", "$2b$", "$2x$", "$2y$"];

/// Builds the canonical byte encoding `secret ':' passcode`.
///
/// # Errors
///
/// Returns `InvalidCredentialInput` if either part is empty.
pub fn combine(secret: &str, passcode: &str) -> Result<Vec<u8>> {
    if secret.is_empty() || passcode.is_empty() {
        return Err(SolaceError::InvalidCredentialInput);
    }

    let mut combined = Vec::with_capacity(secret.len() + passcode.len() + 1);
    combined.extend_from_slice(secret.as_bytes());
    combined.push(SEPARATOR);
    combined.extend_from_slice(passcode.as_bytes());
    Ok(combined)
}

/// Hashes a secret/passcode pair with a fresh random salt.
///
/// Returns the PHC string (`$argon2id$v=19$...`) as bytes.
pub fn hash(secret: &str, passcode: &str) -> Result<Vec<u8>> {
    let combined = combine(secret, passcode)?;
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = hasher()?
        .hash_password(&combined, &salt)
        .map_err(|e| SolaceError::Hashing(e.to_string()))?
        .to_string();

    Ok(password_hash.into_bytes())
}

/// Checks a secret/passcode pair against a stored hash.
///
/// A mismatch is `Ok(false)`; only an unparseable `stored_hash` is an error.
pub fn verify(secret: &str, passcode: &str, stored_hash: &[u8]) -> Result<bool> {
    let combined = combine(secret, passcode)?;

    let encoded = std::str::from_utf8(stored_hash)
        .map_err(|_| SolaceError::MalformedHash("hash is not UTF-8".to_string()))?;
    if is_bcrypt(encoded) {
        return bcrypt::verify(&combined, encoded)
            .map_err(|e| SolaceError::MalformedHash(e.to_string()));
    }

    let parsed =
        PasswordHash::new(encoded).map_err(|e| SolaceError::MalformedHash(e.to_string()))?;

    match hasher()?.verify_password(&combined, &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(SolaceError::MalformedHash(e.to_string())),
    }
}

/// True if `stored_hash` is a bcrypt hash that should be replaced by
/// [`hash`] once the plain credentials are known.
pub fn is_legacy(stored_hash: &[u8]) -> bool {
    std::str::from_utf8(stored_hash).map_or(false, is_bcrypt)
}

fn is_bcrypt(encoded: &str) -> bool {
    BCRYPT_PREFIXES.iter().any(|prefix| encoded.starts_with(prefix))
}

fn hasher() -> Result<Argon2<'static>> {
    let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, None)
        .map_err(|e| SolaceError::Hashing(format!("invalid argon2 params: {}", e)))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}
