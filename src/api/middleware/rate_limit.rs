//! Per-client rate limiting middleware.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;

/// Rejects requests from clients that exhausted their token bucket.
///
/// # Key Extraction
///
/// The socket peer address, or the forwarding headers when the service runs
/// with `BEHIND_PROXY`. Requests without connection info share one bucket.
///
/// # Errors
///
/// Returns `429 Too Many Requests` once the client is over its limit.
pub async fn layer(State(st): State<AppState>, req: Request, next: Next) -> Result<Response, AppError> {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0), |info| info.0);

    let ip = client_ip(req.headers(), peer, st.behind_proxy);

    if !st.rate_limiter.allow(ip) {
        tracing::debug!(%ip, "rate limit exceeded");
        return Err(AppError::RateLimitExceeded);
    }

    Ok(next.run(req).await)
}
