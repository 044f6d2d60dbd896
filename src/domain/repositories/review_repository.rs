//! Repository trait for book reviews.

use crate::domain::entities::{Review, ReviewFields};
use crate::domain::filters::{Filters, Page};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for reviews.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgReviewRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the book does not exist.
    async fn insert(
        &self,
        book_id: i64,
        user_id: i64,
        fields: ReviewFields,
    ) -> Result<Review, AppError>;

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the review does not exist.
    async fn get(&self, id: i64) -> Result<Review, AppError>;

    async fn get_all(&self, filters: Filters) -> Result<Page<Review>, AppError>;

    async fn get_for_book(&self, book_id: i64, filters: Filters) -> Result<Page<Review>, AppError>;

    async fn get_for_user(&self, user_id: i64, filters: Filters) -> Result<Page<Review>, AppError>;

    /// # Errors
    ///
    /// Returns [`AppError::EditConflict`] on a version mismatch.
    async fn update(&self, review: Review) -> Result<Review, AppError>;

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the review does not exist.
    async fn delete(&self, id: i64) -> Result<(), AppError>;

    async fn count(&self) -> Result<i64, AppError>;
}
