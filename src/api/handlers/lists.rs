//! Handlers for reading lists and their books.

use axum::extract::State;

use crate::api::API_PREFIX;
use crate::api::dto::{AddBookRequest, CreateListRequest, ListQuery};
use crate::api::envelope::Envelope;
use crate::api::extract::{ActivatedUser, JsonBody, QueryParams, ResourceId, ResourceIds};
use crate::domain::entities::{ListPatch, book, reading_list};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a reading list owned by the caller.
///
/// # Endpoint
///
/// `POST /api/v1/lists`
///
/// # Request Body
///
/// ```json
/// { "name": "Summer", "description": "Beach reads", "status": "reading" }
/// ```
pub async fn create_list_handler(
    State(state): State<AppState>,
    ActivatedUser(user): ActivatedUser,
    JsonBody(req): JsonBody<CreateListRequest>,
) -> Result<Envelope, AppError> {
    let list = state
        .reading_list_service
        .create(&user, req.into())
        .await?;
    Envelope::created(format!("{API_PREFIX}/lists/{}", list.id)).insert("reading_list", &list)
}

/// `GET /api/v1/lists/{id}`
pub async fn show_list_handler(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> Result<Envelope, AppError> {
    let list = state.reading_list_service.get(id).await?;
    Envelope::ok().insert("reading_list", &list)
}

/// `GET /api/v1/lists`
pub async fn list_lists_handler(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListQuery>,
) -> Result<Envelope, AppError> {
    let filters = query.filters("id", reading_list::SORT_SAFELIST)?;
    let page = state.reading_list_service.list(filters).await?;
    Envelope::ok().page("reading_lists", &page)
}

/// Partially updates one of the caller's lists.
///
/// # Endpoint
///
/// `PUT /api/v1/lists/{id}`
///
/// # Errors
///
/// Returns 403 when the caller does not own the list.
pub async fn update_list_handler(
    State(state): State<AppState>,
    ActivatedUser(user): ActivatedUser,
    ResourceId(id): ResourceId,
    JsonBody(patch): JsonBody<ListPatch>,
) -> Result<Envelope, AppError> {
    let list = state.reading_list_service.update(&user, id, patch).await?;
    Envelope::ok().insert("reading_list", &list)
}

/// `DELETE /api/v1/lists/{id}`
pub async fn delete_list_handler(
    State(state): State<AppState>,
    ActivatedUser(user): ActivatedUser,
    ResourceId(id): ResourceId,
) -> Result<Envelope, AppError> {
    state.reading_list_service.delete(&user, id).await?;
    Ok(Envelope::ok().message("reading list successfully deleted"))
}

/// Books in a list.
///
/// # Endpoint
///
/// `GET /api/v1/lists/{id}/books`
pub async fn list_list_books_handler(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
    QueryParams(query): QueryParams<ListQuery>,
) -> Result<Envelope, AppError> {
    let filters = query.filters("id", book::SORT_SAFELIST)?;
    let page = state.reading_list_service.books(id, filters).await?;
    Envelope::ok().page("books", &page)
}

/// Adds a book to one of the caller's lists. Adding a book twice is a no-op.
///
/// # Endpoint
///
/// `POST /api/v1/lists/{id}/books`
///
/// # Request Body
///
/// ```json
/// { "book_id": 42 }
/// ```
///
/// # Errors
///
/// Returns 422 under `book_id` for a book that does not exist.
pub async fn add_list_book_handler(
    State(state): State<AppState>,
    ActivatedUser(user): ActivatedUser,
    ResourceId(id): ResourceId,
    JsonBody(req): JsonBody<AddBookRequest>,
) -> Result<Envelope, AppError> {
    if req.book_id <= 0 {
        return Err(AppError::field("book_id", "must be a positive integer"));
    }

    state
        .reading_list_service
        .add_book(&user, id, req.book_id)
        .await?;

    Ok(Envelope::created(format!("{API_PREFIX}/lists/{id}/books"))
        .message("book successfully added to reading list"))
}

/// `DELETE /api/v1/lists/{id}/books/{book_id}`
pub async fn remove_list_book_handler(
    State(state): State<AppState>,
    ActivatedUser(user): ActivatedUser,
    ResourceIds(id, book_id): ResourceIds,
) -> Result<Envelope, AppError> {
    state
        .reading_list_service
        .remove_book(&user, id, book_id)
        .await?;
    Ok(Envelope::ok().message("book successfully removed from reading list"))
}
