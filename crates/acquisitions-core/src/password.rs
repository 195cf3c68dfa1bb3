//! Argon2 password hashing.
//!
//! Both functions are CPU-bound; async callers should run them on
//! `tokio::task::spawn_blocking`.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::{CoreError, CoreResult};

pub fn hash_password(password: &str) -> CoreResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CoreError::PasswordHash(format!("failed to hash password: {e}")))?;

    Ok(hash.to_string())
}

/// Returns `Ok(false)` for a wrong password and `Err` only when `hash` is not
/// a valid PHC string.
pub fn verify_password(hash: &str, password: &str) -> CoreResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| CoreError::PasswordHash(format!("invalid password hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
