//! Request extractors whose rejections render as [`AppError`] envelopes.

use std::convert::Infallible;

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::{StatusCode, request::Parts},
};
use serde::de::DeserializeOwned;
use serde_json::error::Category;

use crate::api::middleware::auth::require_activated;
use crate::domain::entities::{Identity, User};
use crate::error::AppError;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 1_048_576;

/// JSON request body.
///
/// Unlike [`axum::Json`] it does not insist on a `Content-Type` header, and
/// every decoding failure becomes a 400 with a message naming the problem.
/// Unknown keys are rejected by the target types themselves via
/// `#[serde(deny_unknown_fields)]`.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                AppError::bad_request(format!(
                    "body must not be larger than {MAX_BODY_BYTES} bytes"
                ))
            } else {
                AppError::bad_request(format!("failed to read body: {}", rejection.body_text()))
            }
        })?;

        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|e| AppError::BadRequest(describe_json_error(&e, bytes.is_empty())))
    }
}

/// Turns a `serde_json` failure into a client-facing message.
fn describe_json_error(e: &serde_json::Error, empty: bool) -> String {
    let message = e.to_string();

    match e.classify() {
        Category::Eof if empty => "body must not be empty".to_string(),
        Category::Syntax if message.starts_with("trailing characters") => {
            "body must only contain a single JSON value".to_string()
        }
        Category::Eof | Category::Syntax | Category::Io => format!(
            "body contains badly-formed JSON (at line {}, column {})",
            e.line(),
            e.column()
        ),
        Category::Data => {
            if let Some(key) = message
                .strip_prefix("unknown field `")
                .and_then(|rest| rest.split('`').next())
            {
                format!("body contains unknown key \"{key}\"")
            } else if message.starts_with("invalid type") {
                format!(
                    "body contains incorrect JSON type (at line {}, column {})",
                    e.line(),
                    e.column()
                )
            } else {
                format!("body contains invalid JSON: {message}")
            }
        }
    }
}

/// Query string parameters, rejected with 400 when they cannot be decoded.
#[derive(Debug)]
pub struct QueryParams<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| QueryParams(value))
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))
    }
}

/// Parses a resource id path segment. Anything but a positive integer is a 404.
pub fn parse_id(raw: &str) -> Result<i64, AppError> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AppError::NotFound),
    }
}

/// The `{id}` path parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceId(pub i64);

impl<S: Send + Sync> FromRequestParts<S> for ResourceId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::NotFound)?;
        parse_id(&raw).map(ResourceId)
    }
}

/// Two id path parameters, such as `/lists/{id}/books/{book_id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceIds(pub i64, pub i64);

impl<S: Send + Sync> FromRequestParts<S> for ResourceIds {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path((first, second)) = Path::<(String, String)>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::NotFound)?;
        Ok(ResourceIds(parse_id(&first)?, parse_id(&second)?))
    }
}

/// Reads the identity attached by the authentication middleware. A request
/// that never passed through it is anonymous.
impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Identity>().cloned().unwrap_or_default())
    }
}

/// The calling user, who must be authenticated and activated.
#[derive(Debug, Clone)]
pub struct ActivatedUser(pub User);

impl<S: Send + Sync> FromRequestParts<S> for ActivatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = parts.extensions.get::<Identity>();
        let user = require_activated(identity.unwrap_or(&Identity::Anonymous))?;
        Ok(ActivatedUser(user.clone()))
    }
}
