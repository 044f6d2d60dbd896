//! Book review service.

use std::sync::Arc;

use crate::domain::entities::{Review, ReviewFields, ReviewPatch, User};
use crate::domain::filters::{Filters, Page};
use crate::domain::repositories::{BookRepository, ReviewRepository};
use crate::error::AppError;

/// Service for reviews. Only a review's author may change or delete it.
pub struct ReviewService<
    R: ReviewRepository + ?Sized = dyn ReviewRepository,
    B: BookRepository + ?Sized = dyn BookRepository,
> {
    reviews: Arc<R>,
    books: Arc<B>,
}

impl<R: ReviewRepository + ?Sized, B: BookRepository + ?Sized> ReviewService<R, B> {
    pub fn new(reviews: Arc<R>, books: Arc<B>) -> Self {
        Self { reviews, books }
    }

    /// Posts a review of `book_id` by `author`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the book does not exist and
    /// [`AppError::FailedValidation`] if any field is invalid.
    pub async fn create(
        &self,
        author: &User,
        book_id: i64,
        fields: ReviewFields,
    ) -> Result<Review, AppError> {
        let book = self.books.get(book_id).await?;
        fields.check()?;
        self.reviews.insert(book.id, author.id, fields).await
    }

    pub async fn get(&self, id: i64) -> Result<Review, AppError> {
        self.reviews.get(id).await
    }

    pub async fn list(&self, filters: Filters) -> Result<Page<Review>, AppError> {
        self.reviews.get_all(filters).await
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the book does not exist.
    pub async fn list_for_book(
        &self,
        book_id: i64,
        filters: Filters,
    ) -> Result<Page<Review>, AppError> {
        let book = self.books.get(book_id).await?;
        self.reviews.get_for_book(book.id, filters).await
    }

    pub async fn list_for_user(
        &self,
        user_id: i64,
        filters: Filters,
    ) -> Result<Page<Review>, AppError> {
        self.reviews.get_for_user(user_id, filters).await
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotPermitted`] unless `caller` wrote the review.
    pub async fn update(
        &self,
        caller: &User,
        id: i64,
        patch: ReviewPatch,
    ) -> Result<Review, AppError> {
        let mut review = self.authored(caller, id).await?;
        patch.apply(&mut review.fields);
        review.fields.check()?;
        self.reviews.update(review).await
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotPermitted`] unless `caller` wrote the review.
    pub async fn delete(&self, caller: &User, id: i64) -> Result<(), AppError> {
        self.authored(caller, id).await?;
        self.reviews.delete(id).await
    }

    async fn authored(&self, caller: &User, id: i64) -> Result<Review, AppError> {
        let review = self.reviews.get(id).await?;
        if !review.is_authored_by(caller.id) {
            return Err(AppError::NotPermitted);
        }
        Ok(review)
    }
}
