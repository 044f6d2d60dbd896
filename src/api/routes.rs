//! API route configuration.
//!
//! Routes are grouped by the identity they require. Both groups are mounted
//! under [`crate::api::API_PREFIX`] by [`crate::routes::app_router`].

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::api::handlers::{
    activate_user_handler, add_list_book_handler, create_authentication_token_handler,
    create_book_handler, create_list_handler, create_review_handler, delete_book_handler,
    delete_list_handler, delete_review_handler, healthcheck_handler, list_book_reviews_handler,
    list_books_handler, list_list_books_handler, list_lists_handler, list_reviews_handler,
    list_user_lists_handler, list_user_reviews_handler, register_user_handler,
    remove_list_book_handler, search_books_handler, show_book_handler, show_list_handler,
    show_review_handler, show_user_handler, update_book_handler, update_list_handler,
    update_review_handler,
};
use crate::api::middleware::auth;
use crate::state::AppState;

/// Routes open to anonymous clients.
///
/// # Endpoints
///
/// - `GET  /healthcheck`           - Service status
/// - `POST /users`                 - Register
/// - `PUT  /users/activated`       - Activate with an emailed token
/// - `POST /tokens/authentication` - Log in
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/healthcheck", get(healthcheck_handler))
        .route("/users", post(register_user_handler))
        .route("/users/activated", put(activate_user_handler))
        .route(
            "/tokens/authentication",
            post(create_authentication_token_handler),
        )
}

/// Routes that need an authenticated, activated user.
///
/// # Endpoints
///
/// - `GET              /users/{id}`                  - User profile
/// - `GET              /users/{id}/lists`            - A user's reading lists
/// - `GET              /users/{id}/reviews`          - A user's reviews
/// - `GET, POST        /books`                       - List / create books
/// - `GET              /books/search`                - Full-text search
/// - `GET, PUT, DELETE /books/{id}`                  - Show / update / delete a book
/// - `GET, POST        /books/{id}/reviews`          - A book's reviews / post a review
/// - `GET, POST        /lists`                       - List / create reading lists
/// - `GET, PUT, DELETE /lists/{id}`                  - Show / update / delete a list
/// - `GET, POST        /lists/{id}/books`            - Books in a list / add a book
/// - `DELETE           /lists/{id}/books/{book_id}`  - Remove a book from a list
/// - `GET              /reviews`                     - All reviews
/// - `GET, PUT, DELETE /reviews/{id}`                - Show / update / delete a review
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/users/{id}", get(show_user_handler))
        .route("/users/{id}/lists", get(list_user_lists_handler))
        .route("/users/{id}/reviews", get(list_user_reviews_handler))
        .route("/books", get(list_books_handler).post(create_book_handler))
        .route("/books/search", get(search_books_handler))
        .route(
            "/books/{id}",
            get(show_book_handler)
                .put(update_book_handler)
                .delete(delete_book_handler),
        )
        .route(
            "/books/{id}/reviews",
            get(list_book_reviews_handler).post(create_review_handler),
        )
        .route("/lists", get(list_lists_handler).post(create_list_handler))
        .route(
            "/lists/{id}",
            get(show_list_handler)
                .put(update_list_handler)
                .delete(delete_list_handler),
        )
        .route(
            "/lists/{id}/books",
            get(list_list_books_handler).post(add_list_book_handler),
        )
        .route(
            "/lists/{id}/books/{book_id}",
            delete(remove_list_book_handler),
        )
        .route("/reviews", get(list_reviews_handler))
        .route(
            "/reviews/{id}",
            get(show_review_handler)
                .put(update_review_handler)
                .delete(delete_review_handler),
        )
        .route_layer(middleware::from_fn(auth::activated))
}
