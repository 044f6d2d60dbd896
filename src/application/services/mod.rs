//! Business logic services for the application layer.

pub mod book_service;
pub mod reading_list_service;
pub mod review_service;
pub mod token_service;
pub mod user_service;

pub use book_service::BookService;
pub use reading_list_service::ReadingListService;
pub use review_service::ReviewService;
pub use token_service::TokenService;
pub use user_service::{AccountSettings, UserService};
