//! Argon2id password hashing.
//!
//! Hashing is CPU-bound, so the async wrappers run it on the blocking pool.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use tokio::sync::OnceCell;

use crate::error::{AppError, AppResult};

static DUMMY_HASH: OnceCell<String> = OnceCell::const_new();

/// Hash a password with a fresh random salt; returns a PHC string.
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("password hashing failed: {}", e)))
}

/// `true` when `password` matches the stored PHC string. An unparsable hash
/// never matches.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

pub async fn hash_password_blocking(password: String) -> AppResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(format!("hashing task failed: {}", e)))?
}

pub async fn verify_password_blocking(password: String, hash: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("verification task failed: {}", e)))
}

/// A real Argon2 hash of a throwaway secret. Logins for unknown usernames
/// verify against it so they cost as much as a wrong password.
pub async fn dummy_hash() -> AppResult<String> {
    DUMMY_HASH
        .get_or_try_init(|| hash_password_blocking(super::generate_api_key()))
        .await
        .cloned()
}
