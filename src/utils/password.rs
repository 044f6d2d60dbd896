//! Password hashing with bcrypt.
//!
//! bcrypt is CPU-bound, so both operations run on Tokio's blocking pool.

use crate::error::AppError;

/// Hashes a plaintext password at the given bcrypt cost.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if hashing fails or the blocking task panics.
pub async fn hash_password(plaintext: String, cost: u32) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(plaintext, cost))
        .await
        .map_err(|e| AppError::internal(format!("password hashing task failed: {e}")))?
        .map_err(|e| AppError::internal(format!("password hashing failed: {e}")))
}

/// Checks a plaintext password against a stored bcrypt hash.
///
/// A mismatch is `Ok(false)`; only a malformed hash is an error.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if the stored hash cannot be parsed.
pub async fn verify_password(plaintext: String, hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(plaintext, &hash))
        .await
        .map_err(|e| AppError::internal(format!("password verification task failed: {e}")))?
        .map_err(|e| AppError::internal(format!("password verification failed: {e}")))
}
