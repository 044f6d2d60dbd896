mod common;

use axum::{Router, http::StatusCode, routing::get};
use axum_test::TestServer;
use serde_json::Value;

use bookclub::error::SERVER_ERROR_MESSAGE;
use bookclub::infrastructure::rate_limiter::RateLimitSettings;
use bookclub::routes::with_middleware;

async fn explode() -> StatusCode {
    panic!("handler exploded")
}

fn server() -> TestServer {
    let (state, _, _) = common::test_state(RateLimitSettings {
        enabled: true,
        rps: 100.0,
        burst: 100,
    });
    let routes = Router::new().route("/api/v1/explode", get(explode));
    TestServer::new(with_middleware(routes, state)).unwrap()
}

#[tokio::test]
async fn test_handler_panic_is_opaque_500() {
    let response = server().get("/api/v1/explode").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.header("connection"), "close");
    assert_eq!(response.header("vary"), "Authorization");
    assert_eq!(response.header("content-type"), "application/json");

    let body = response.json::<Value>();
    assert_eq!(body["error"], SERVER_ERROR_MESSAGE);
    assert!(!response.text().contains("handler exploded"));
}

#[tokio::test]
async fn test_server_keeps_serving_after_panic() {
    let server = server();

    for _ in 0..3 {
        server
            .get("/api/v1/explode")
            .await
            .assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    }

    server
        .get("/api/v1/missing")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
