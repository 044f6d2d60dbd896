//! Repository trait definitions for the domain layer.
//!
//! These traits abstract data access following the Repository pattern and are
//! implemented in `crate::infrastructure::persistence`. Mock implementations
//! are generated via `mockall` for unit tests.
//!
//! # Available Repositories
//!
//! - [`UserRepository`] - User accounts and token-based lookup
//! - [`TokenRepository`] - Hashed bearer tokens
//! - [`BookRepository`] - Book catalogue and search
//! - [`ReadingListRepository`] - Reading lists and their books
//! - [`ReviewRepository`] - Book reviews

pub mod book_repository;
pub mod reading_list_repository;
pub mod review_repository;
pub mod token_repository;
pub mod user_repository;

pub use book_repository::BookRepository;
pub use reading_list_repository::ReadingListRepository;
pub use review_repository::ReviewRepository;
pub use token_repository::TokenRepository;
pub use user_repository::UserRepository;

#[cfg(test)]
pub use book_repository::MockBookRepository;
#[cfg(test)]
pub use reading_list_repository::MockReadingListRepository;
#[cfg(test)]
pub use review_repository::MockReviewRepository;
#[cfg(test)]
pub use token_repository::MockTokenRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
