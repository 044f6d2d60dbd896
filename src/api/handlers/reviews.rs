//! Handlers for book reviews.

use axum::extract::State;

use crate::api::API_PREFIX;
use crate::api::dto::{CreateReviewRequest, ListQuery};
use crate::api::envelope::Envelope;
use crate::api::extract::{ActivatedUser, JsonBody, QueryParams, ResourceId};
use crate::domain::entities::{ReviewPatch, review::SORT_SAFELIST};
use crate::error::AppError;
use crate::state::AppState;

/// Posts the caller's review of a book.
///
/// # Endpoint
///
/// `POST /api/v1/books/{id}/reviews`
///
/// # Request Body
///
/// ```json
/// { "rating": 5, "content": "Could not put it down." }
/// ```
///
/// # Errors
///
/// Returns 404 for an unknown book and 422 for invalid fields.
pub async fn create_review_handler(
    State(state): State<AppState>,
    ActivatedUser(user): ActivatedUser,
    ResourceId(book_id): ResourceId,
    JsonBody(req): JsonBody<CreateReviewRequest>,
) -> Result<Envelope, AppError> {
    let review = state
        .review_service
        .create(&user, book_id, req.into())
        .await?;
    Envelope::created(format!("{API_PREFIX}/reviews/{}", review.id)).insert("review", &review)
}

/// `GET /api/v1/books/{id}/reviews`
pub async fn list_book_reviews_handler(
    State(state): State<AppState>,
    ResourceId(book_id): ResourceId,
    QueryParams(query): QueryParams<ListQuery>,
) -> Result<Envelope, AppError> {
    let filters = query.filters("id", SORT_SAFELIST)?;
    let page = state.review_service.list_for_book(book_id, filters).await?;
    Envelope::ok().page("reviews", &page)
}

/// `GET /api/v1/reviews`
pub async fn list_reviews_handler(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListQuery>,
) -> Result<Envelope, AppError> {
    let filters = query.filters("id", SORT_SAFELIST)?;
    let page = state.review_service.list(filters).await?;
    Envelope::ok().page("reviews", &page)
}

/// `GET /api/v1/reviews/{id}`
pub async fn show_review_handler(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> Result<Envelope, AppError> {
    let review = state.review_service.get(id).await?;
    Envelope::ok().insert("review", &review)
}

/// Partially updates the caller's own review.
///
/// # Endpoint
///
/// `PUT /api/v1/reviews/{id}`
///
/// # Errors
///
/// Returns 403 when the caller did not write the review.
pub async fn update_review_handler(
    State(state): State<AppState>,
    ActivatedUser(user): ActivatedUser,
    ResourceId(id): ResourceId,
    JsonBody(patch): JsonBody<ReviewPatch>,
) -> Result<Envelope, AppError> {
    let review = state.review_service.update(&user, id, patch).await?;
    Envelope::ok().insert("review", &review)
}

/// `DELETE /api/v1/reviews/{id}`
pub async fn delete_review_handler(
    State(state): State<AppState>,
    ActivatedUser(user): ActivatedUser,
    ResourceId(id): ResourceId,
) -> Result<Envelope, AppError> {
    state.review_service.delete(&user, id).await?;
    Ok(Envelope::ok().message("review successfully deleted"))
}
