//! Core domain entities of the book club.
//!
//! Entities are plain data structures. The client-editable part of books,
//! reading lists and reviews lives in a separate `*Fields` struct so that
//! creation and merged partial updates run through the same validation.
//!
//! # Entity Types
//!
//! - [`User`] - A registered account, and the request [`Identity`] built from it
//! - [`Token`] - A scoped, expiring bearer token
//! - [`Book`] - A catalogued book
//! - [`ReadingList`] - A user-owned collection of books
//! - [`Review`] - A user's rating and opinion of a book

pub mod book;
pub mod reading_list;
pub mod review;
pub mod token;
pub mod user;

pub use book::{Book, BookFields, BookPatch, BookSearch};
pub use reading_list::{ListFields, ListPatch, ReadingList};
pub use review::{Review, ReviewFields, ReviewPatch};
pub use token::{Token, TokenScope};
pub use user::{Identity, NewUser, User};
