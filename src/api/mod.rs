//! REST API layer for HTTP request/response handling.
//!
//! This layer translates HTTP requests into service calls and formats
//! responses as JSON envelopes.
//!
//! # Modules
//!
//! - [`dto`] - Request bodies and query parameters
//! - [`envelope`] - Single-root-key JSON responses
//! - [`extract`] - Extractors that reject with [`crate::error::AppError`]
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Authentication, rate limiting and tracing
//! - [`routes`] - Route configuration and composition

pub mod dto;
pub mod envelope;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod routes;

/// Prefix every versioned endpoint is mounted under.
pub const API_PREFIX: &str = "/api/v1";
