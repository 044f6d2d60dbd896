//! Health check endpoint.

use axum::{Json, extract::State};

use crate::api::dto::{HealthResponse, SystemInfo};
use crate::state::AppState;

/// Reports that the service is up.
///
/// # Endpoint
///
/// `GET /api/v1/healthcheck`
///
/// # Response
///
/// ```json
/// {
///   "status": "available",
///   "system_info": { "environment": "development", "version": "0.1.0" }
/// }
/// ```
pub async fn healthcheck_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "available",
        system_info: SystemInfo {
            environment: state.environment.clone(),
            version: env!("CARGO_PKG_VERSION"),
        },
    })
}
