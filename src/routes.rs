//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `/api/v1/*` - REST API (see [`crate::api::routes`])
//! - anything else - `404` envelope
//!
//! # Middleware
//!
//! From the outside in:
//!
//! - **Path normalization** - Trailing slash handling
//! - **Tracing** - Structured request/response logging
//! - **Panic recovery** - `500` with `Connection: close`
//! - **Rate limiting** - Per-IP token bucket
//! - **Authentication** - Bearer token, anonymous when absent
//! - **Body limit** - 1 MiB

use axum::{Router, extract::DefaultBodyLimit, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

use crate::api::{self, API_PREFIX};
use crate::api::extract::MAX_BODY_BYTES;
use crate::api::handlers::{method_not_allowed_handler, not_found_handler};
use crate::api::middleware::{auth, panic, rate_limit, tracing};
use crate::state::AppState;

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}

/// Routes and middleware without path normalization.
pub fn router(state: AppState) -> Router {
    let api_router = api::routes::public_routes()
        .merge(api::routes::protected_routes())
        .method_not_allowed_fallback(method_not_allowed_handler);

    let routes = Router::new()
        .nest(API_PREFIX, api_router)
        .fallback(not_found_handler);

    with_middleware(routes, state)
}

/// Wraps `routes` in the request middleware stack and binds the state.
pub fn with_middleware(routes: Router<AppState>, state: AppState) -> Router {
    routes
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::authenticate,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::layer,
        ))
        .layer(panic::layer())
        .layer(tracing::layer())
        .with_state(state)
}
