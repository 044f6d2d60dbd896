mod common;

use axum::http::StatusCode;
use bookclub::infrastructure::rate_limiter::RateLimitSettings;
use serde_json::Value;

#[tokio::test]
async fn test_burst_exhaustion_is_429() {
    let app = common::test_app_with_limits(RateLimitSettings {
        enabled: true,
        rps: 0.0,
        burst: 1,
    });

    app.server
        .get("/api/v1/healthcheck")
        .await
        .assert_status_ok();

    let response = app.server.get("/api/v1/healthcheck").await;
    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.json::<Value>()["error"], "rate limit exceeded");
}

#[tokio::test]
async fn test_disabled_limiter_never_rejects() {
    let app = common::test_app();

    for _ in 0..20 {
        app.server
            .get("/api/v1/healthcheck")
            .await
            .assert_status_ok();
    }
}
