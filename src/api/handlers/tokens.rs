//! Handler for issuing authentication tokens.

use axum::{extract::State, http::StatusCode};

use crate::api::dto::AuthenticationRequest;
use crate::api::envelope::Envelope;
use crate::api::extract::JsonBody;
use crate::error::AppError;
use crate::state::AppState;

/// Exchanges email and password for a bearer token.
///
/// # Endpoint
///
/// `POST /api/v1/tokens/authentication`
///
/// # Response
///
/// ```json
/// { "authentication_token": { "token": "Y3QMGX3PJ3WLRL2YRTQGQ6KRHU", "expiry": "..." } }
/// ```
///
/// # Errors
///
/// Returns 422 for malformed input and 401 for wrong credentials.
pub async fn create_authentication_token_handler(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<AuthenticationRequest>,
) -> Result<Envelope, AppError> {
    let token = state.user_service.login(&req.email, &req.password).await?;
    Envelope::new(StatusCode::CREATED).insert("authentication_token", &token)
}
