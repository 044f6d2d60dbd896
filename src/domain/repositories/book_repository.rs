//! Repository trait for the book catalogue.

use crate::domain::entities::{Book, BookFields, BookSearch};
use crate::domain::filters::{Filters, Page};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for books.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgBookRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn insert(&self, fields: BookFields) -> Result<Book, AppError>;

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the book does not exist.
    async fn get(&self, id: i64) -> Result<Book, AppError>;

    /// One page of the catalogue, ordered by `filters`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn get_all(&self, filters: Filters) -> Result<Page<Book>, AppError>;

    /// Full-text search over title, author and genre.
    ///
    /// An empty criterion matches every book.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn search(&self, search: BookSearch, filters: Filters) -> Result<Page<Book>, AppError>;

    /// Saves `book` if its version still matches.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::EditConflict`] on a version mismatch.
    async fn update(&self, book: Book) -> Result<Book, AppError>;

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the book does not exist.
    async fn delete(&self, id: i64) -> Result<(), AppError>;

    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn count(&self) -> Result<i64, AppError>;
}
