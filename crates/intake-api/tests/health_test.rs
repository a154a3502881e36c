//! Health, OpenAPI and middleware header tests.

mod helpers;

use axum::http::{HeaderName, HeaderValue};
use helpers::RecordingDispatcher;
use helpers::{create_test_config, setup_test_server, setup_test_server_with_config};
use serde_json::Value;
use std::sync::Arc;

#[tokio::test]
async fn test_health_check() {
    let server = setup_test_server(Arc::new(RecordingDispatcher::new()));

    let response = server.get("/health").await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["status"], "alive");
}

#[tokio::test]
async fn test_request_id_generated_and_echoed() {
    let server = setup_test_server(Arc::new(RecordingDispatcher::new()));

    let generated = server.get("/health").await;
    let id = generated.header("x-request-id");
    assert_eq!(id.to_str().expect("ascii").len(), 36);

    let echoed = server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("client-trace-42"),
        )
        .await;
    assert_eq!(echoed.header("x-request-id"), "client-trace-42");
}

#[tokio::test]
async fn test_security_headers_on_error_responses() {
    let server = setup_test_server(Arc::new(RecordingDispatcher::new()));

    let response = server.post("/api/submit-project").text("not a form").await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(response.header("x-content-type-options"), "nosniff");
    assert_eq!(response.header("x-frame-options"), "DENY");
    assert_eq!(response.header("cache-control"), "no-store, private");
    assert!(response.headers().get("strict-transport-security").is_none());
}

#[tokio::test]
async fn test_hsts_in_production() {
    let config = create_test_config(&[
        ("ENVIRONMENT", "production"),
        ("CORS_ORIGINS", "https://www.example.com"),
    ]);
    let server = setup_test_server_with_config(config, Arc::new(RecordingDispatcher::new()));

    let response = server.get("/health").await;

    assert!(response
        .header("strict-transport-security")
        .to_str()
        .expect("ascii")
        .starts_with("max-age="));
}

#[tokio::test]
async fn test_openapi_document_lists_routes() {
    let server = setup_test_server(Arc::new(RecordingDispatcher::new()));

    let response = server.get("/api/openapi.json").await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert!(body["paths"]["/api/submit-project"]["post"].is_object());
    assert!(body["paths"]["/health"]["get"].is_object());
    assert!(body["components"]["schemas"]["ErrorResponse"].is_object());
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let server = setup_test_server(Arc::new(RecordingDispatcher::new()));

    let response = server.get("/api/does-not-exist").await;

    assert_eq!(response.status_code(), 404);
}
