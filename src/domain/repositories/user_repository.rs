//! Repository trait for user accounts.

use crate::domain::entities::{NewUser, TokenScope, User};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for user accounts.
///
/// Users are never hard-deleted. Email lookups are case-insensitive.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUserRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a new, not yet activated user.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::FailedValidation`] with an `email` entry if the
    /// address is already registered.
    /// Returns [`AppError::Internal`] on database errors.
    async fn insert(&self, new_user: NewUser) -> Result<User, AppError>;

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no user has this ID.
    async fn get(&self, id: i64) -> Result<User, AppError>;

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no user has this email.
    async fn get_by_email(&self, email: &str) -> Result<User, AppError>;

    /// Saves `user` if its version still matches the stored one.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::EditConflict`] if the row changed or vanished since
    /// it was read.
    /// Returns [`AppError::FailedValidation`] on a duplicate email.
    async fn update(&self, user: User) -> Result<User, AppError>;

    /// Finds the owner of a non-expired token with the given scope and hash.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] when the token is unknown or expired.
    async fn get_for_token(&self, scope: TokenScope, token_hash: Vec<u8>)
    -> Result<User, AppError>;

    /// Number of registered users, split into (total, activated).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn count(&self) -> Result<(i64, i64), AppError>;
}
