//! JSON envelope responses.
//!
//! Every body has a single root key naming its content, for example
//! `{"book": {...}}`. Paginated responses add an `@metadata` key next to the
//! items.

use axum::{
    body::Body,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::filters::Page;
use crate::error::AppError;

pub const METADATA_KEY: &str = "@metadata";

/// Response builder for enveloped JSON bodies.
#[derive(Debug)]
pub struct Envelope {
    status: StatusCode,
    location: Option<String>,
    body: Map<String, Value>,
}

impl Envelope {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            location: None,
            body: Map::new(),
        }
    }

    pub fn ok() -> Self {
        Self::new(StatusCode::OK)
    }

    /// 201 response pointing at the new resource.
    pub fn created(location: impl Into<String>) -> Self {
        Self::new(StatusCode::CREATED).with_location(location)
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Adds `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if `value` cannot be serialized.
    pub fn insert<T: Serialize>(mut self, key: &str, value: &T) -> Result<Self, AppError> {
        let value = serde_json::to_value(value)
            .map_err(|e| AppError::internal(format!("failed to encode {key}: {e}")))?;
        self.body.insert(key.to_string(), value);
        Ok(self)
    }

    /// Adds the page items under `key` and its metadata under `@metadata`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the items cannot be serialized.
    pub fn page<T: Serialize>(self, key: &str, page: &Page<T>) -> Result<Self, AppError> {
        self.insert(key, &page.items)?
            .insert(METADATA_KEY, &page.metadata)
    }

    /// Adds a `message` entry.
    pub fn message(mut self, message: &str) -> Self {
        self.body
            .insert("message".to_string(), Value::String(message.to_string()));
        self
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        let bytes = match serde_json::to_vec_pretty(&self.body) {
            Ok(bytes) => bytes,
            Err(e) => {
                return AppError::internal(format!("failed to encode response: {e}"))
                    .into_response();
            }
        };

        let mut response = Response::new(Body::from(bytes));
        *response.status_mut() = self.status;
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        if let Some(location) = self.location {
            match HeaderValue::from_str(&location) {
                Ok(value) => {
                    response.headers_mut().insert(header::LOCATION, value);
                }
                Err(e) => tracing::warn!(error = %e, %location, "dropping invalid Location header"),
            }
        }

        response
    }
}
