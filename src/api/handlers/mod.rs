//! HTTP request handlers for API endpoints.
//!
//! Handlers decode input, call a service and wrap the result in an
//! [`Envelope`](crate::api::envelope::Envelope). All errors are
//! [`AppError`](crate::error::AppError) values.

pub mod books;
pub mod fallback;
pub mod health;
pub mod lists;
pub mod reviews;
pub mod tokens;
pub mod users;

pub use books::{
    create_book_handler, delete_book_handler, list_books_handler, search_books_handler,
    show_book_handler, update_book_handler,
};
pub use fallback::{method_not_allowed_handler, not_found_handler};
pub use health::healthcheck_handler;
pub use lists::{
    add_list_book_handler, create_list_handler, delete_list_handler, list_list_books_handler,
    list_lists_handler, remove_list_book_handler, show_list_handler, update_list_handler,
};
pub use reviews::{
    create_review_handler, delete_review_handler, list_book_reviews_handler,
    list_reviews_handler, show_review_handler, update_review_handler,
};
pub use tokens::create_authentication_token_handler;
pub use users::{
    activate_user_handler, list_user_lists_handler, list_user_reviews_handler,
    register_user_handler, show_user_handler,
};
