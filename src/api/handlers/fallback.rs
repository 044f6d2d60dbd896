//! Responses for unmatched routes and methods.

use axum::http::Method;

use crate::error::AppError;

pub async fn not_found_handler() -> AppError {
    AppError::NotFound
}

pub async fn method_not_allowed_handler(method: Method) -> AppError {
    AppError::MethodNotAllowed(method.to_string())
}
