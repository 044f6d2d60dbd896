//! Application layer services implementing business logic.
//!
//! Services orchestrate validation, repository calls and ownership rules.
//! They consume repository traits and are shared with HTTP handlers through
//! [`crate::state::AppState`].
//!
//! # Available Services
//!
//! - [`services::UserService`] - Registration, activation and login
//! - [`services::TokenService`] - Scoped bearer tokens
//! - [`services::BookService`] - Book catalogue
//! - [`services::ReadingListService`] - Reading lists and their books
//! - [`services::ReviewService`] - Book reviews

pub mod background;
pub mod services;
