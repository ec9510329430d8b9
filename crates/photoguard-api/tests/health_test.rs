//! Health and documentation endpoint tests.

mod helpers;

use helpers::setup_test_app;
use serde_json::Value;

#[tokio::test]
async fn test_health() {
    let app = setup_test_app().await;

    let response = app.client().get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "healthy");
    assert_eq!(body["storage_backend"], "local");
}

#[tokio::test]
async fn test_liveness_and_readiness() {
    let app = setup_test_app().await;

    app.client().get("/health/live").await.assert_status_ok();

    let response = app.client().get("/health/ready").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_openapi_document() {
    let app = setup_test_app().await;

    let response = app.client().get("/api/openapi.json").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["paths"]["/api/v1/uploads"].is_object());
}

#[tokio::test]
async fn test_request_id_propagated() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get("/health/live")
        .add_header("X-Request-ID", "req-42")
        .await;

    assert_eq!(response.header("X-Request-ID"), "req-42");
    assert_eq!(response.header("X-Content-Type-Options"), "nosniff");
}
