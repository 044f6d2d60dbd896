//! Handlers for user registration, activation and profiles.

use axum::extract::State;

use crate::api::API_PREFIX;
use crate::api::dto::{ActivateUserRequest, ListQuery, RegisterUserRequest};
use crate::api::envelope::Envelope;
use crate::api::extract::{JsonBody, QueryParams, ResourceId};
use crate::domain::entities::{reading_list, review};
use crate::error::AppError;
use crate::state::AppState;

/// Registers an inactive account and emails its activation token.
///
/// # Endpoint
///
/// `POST /api/v1/users`
///
/// # Request Body
///
/// ```json
/// { "username": "reader", "email": "reader@example.com", "password": "pa55word" }
/// ```
///
/// # Errors
///
/// Returns 422 for invalid input or an email that is already registered.
pub async fn register_user_handler(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterUserRequest>,
) -> Result<Envelope, AppError> {
    let user = state
        .user_service
        .register(req.username, req.email, req.password)
        .await?;

    Envelope::created(format!("{API_PREFIX}/users/{}", user.id)).insert("user", &user)
}

/// Activates the account that owns the given activation token.
///
/// # Endpoint
///
/// `PUT /api/v1/users/activated`
///
/// # Errors
///
/// Returns 422 under `token` for malformed, unknown or expired tokens.
pub async fn activate_user_handler(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<ActivateUserRequest>,
) -> Result<Envelope, AppError> {
    let user = state.user_service.activate(&req.token).await?;
    Envelope::ok().insert("user", &user)
}

/// `GET /api/v1/users/{id}`
pub async fn show_user_handler(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> Result<Envelope, AppError> {
    let user = state.user_service.get(id).await?;
    Envelope::ok().insert("user", &user)
}

/// `GET /api/v1/users/{id}/lists`
pub async fn list_user_lists_handler(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
    QueryParams(query): QueryParams<ListQuery>,
) -> Result<Envelope, AppError> {
    let filters = query.filters("id", reading_list::SORT_SAFELIST)?;
    let user = state.user_service.get(id).await?;
    let page = state
        .reading_list_service
        .list_for_user(user.id, filters)
        .await?;
    Envelope::ok().page("reading_lists", &page)
}

/// `GET /api/v1/users/{id}/reviews`
pub async fn list_user_reviews_handler(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
    QueryParams(query): QueryParams<ListQuery>,
) -> Result<Envelope, AppError> {
    let filters = query.filters("id", review::SORT_SAFELIST)?;
    let user = state.user_service.get(id).await?;
    let page = state.review_service.list_for_user(user.id, filters).await?;
    Envelope::ok().page("reviews", &page)
}
