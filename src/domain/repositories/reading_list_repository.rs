//! Repository trait for reading lists and their books.

use crate::domain::entities::{Book, ListFields, ReadingList};
use crate::domain::filters::{Filters, Page};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for reading lists.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgReadingListRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReadingListRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn insert(&self, user_id: i64, fields: ListFields) -> Result<ReadingList, AppError>;

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the list does not exist.
    async fn get(&self, id: i64) -> Result<ReadingList, AppError>;

    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn get_all(&self, filters: Filters) -> Result<Page<ReadingList>, AppError>;

    /// Lists owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn get_for_user(&self, user_id: i64, filters: Filters)
    -> Result<Page<ReadingList>, AppError>;

    /// # Errors
    ///
    /// Returns [`AppError::EditConflict`] on a version mismatch.
    async fn update(&self, list: ReadingList) -> Result<ReadingList, AppError>;

    /// Deletes the list and its book memberships.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the list does not exist.
    async fn delete(&self, id: i64) -> Result<(), AppError>;

    /// Adds a book to a list. Adding a book twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the book does not exist.
    async fn add_book(&self, list_id: i64, book_id: i64) -> Result<(), AppError>;

    /// Books contained in a list.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn get_books(&self, list_id: i64, filters: Filters) -> Result<Page<Book>, AppError>;

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the book is not in the list.
    async fn remove_book(&self, list_id: i64, book_id: i64) -> Result<(), AppError>;

    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn count(&self) -> Result<i64, AppError>;
}
