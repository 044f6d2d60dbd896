//! Repository trait for bearer token storage.

use crate::domain::entities::{Token, TokenScope};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for hashed tokens.
///
/// Only the SHA-256 hash of a token is stored; the plaintext never reaches
/// this layer's storage.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgTokenRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn insert(&self, token: &Token) -> Result<(), AppError>;

    /// Deletes every token of `user_id` in `scope` and returns how many went.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn delete_all_for_user(&self, scope: TokenScope, user_id: i64) -> Result<u64, AppError>;

    /// Deletes every token whose expiry has passed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn delete_expired(&self) -> Result<u64, AppError>;
}
