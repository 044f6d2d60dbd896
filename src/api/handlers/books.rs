//! Handlers for the book catalogue.

use axum::extract::State;

use crate::api::API_PREFIX;
use crate::api::dto::{CreateBookRequest, ListQuery};
use crate::api::envelope::Envelope;
use crate::api::extract::{JsonBody, QueryParams, ResourceId};
use crate::domain::entities::{BookPatch, book::SORT_SAFELIST};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a book.
///
/// # Endpoint
///
/// `POST /api/v1/books`
///
/// # Request Body
///
/// ```json
/// {
///   "title": "Dune",
///   "author": "Frank Herbert",
///   "isbn": "9780441172719",
///   "publication_date": "1965-08-01",
///   "genre": "science fiction",
///   "description": "Desert planet politics.",
///   "average_rating": 4.3
/// }
/// ```
///
/// # Errors
///
/// Returns 422 with one entry per invalid field.
pub async fn create_book_handler(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateBookRequest>,
) -> Result<Envelope, AppError> {
    let book = state.book_service.create(req.into_fields()?).await?;
    Envelope::created(format!("{API_PREFIX}/books/{}", book.id)).insert("book", &book)
}

/// `GET /api/v1/books/{id}`
pub async fn show_book_handler(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> Result<Envelope, AppError> {
    let book = state.book_service.get(id).await?;
    Envelope::ok().insert("book", &book)
}

/// Lists books.
///
/// # Endpoint
///
/// `GET /api/v1/books?page=1&page_size=10&sort=-average_rating`
pub async fn list_books_handler(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListQuery>,
) -> Result<Envelope, AppError> {
    let filters = query.filters("id", SORT_SAFELIST)?;
    let page = state.book_service.list(filters).await?;
    Envelope::ok().page("books", &page)
}

/// Full-text search over title, author and genre.
///
/// # Endpoint
///
/// `GET /api/v1/books/search?title=dune&author=&genre=science`
///
/// Terms that are absent or empty do not restrict the result.
pub async fn search_books_handler(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListQuery>,
) -> Result<Envelope, AppError> {
    let filters = query.filters("id", SORT_SAFELIST)?;
    let page = state.book_service.search(query.search(), filters).await?;
    Envelope::ok().page("books", &page)
}

/// Partially updates a book. Provided fields are merged before validation.
///
/// # Endpoint
///
/// `PUT /api/v1/books/{id}`
///
/// # Errors
///
/// Returns 404 for an unknown book, 422 if the merged book is invalid and 409
/// on a concurrent edit.
pub async fn update_book_handler(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
    JsonBody(patch): JsonBody<BookPatch>,
) -> Result<Envelope, AppError> {
    let book = state.book_service.update(id, patch).await?;
    Envelope::ok().insert("book", &book)
}

/// `DELETE /api/v1/books/{id}`
pub async fn delete_book_handler(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> Result<Envelope, AppError> {
    state.book_service.delete(id).await?;
    Ok(Envelope::ok().message("book successfully deleted"))
}
