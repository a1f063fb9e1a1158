//! Integration tests for health check endpoints

mod common;

use axum::http::StatusCode;

#[tokio::test]
#[ignore = "requires database"]
async fn test_health_endpoint() {
    let app = common::TestApp::new().await;

    let (status, body) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("healthy"));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_liveness_endpoint() {
    let app = common::TestApp::new().await;

    let (status, body) = app.get("/health/live").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("alive"));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_readiness_reports_database_and_telegram() {
    let app = common::TestApp::new().await;

    let (status, body) = app.get("/health/ready").await;
    assert_eq!(status, StatusCode::OK);

    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["checks"]["database"]["status"], "healthy");
    assert_eq!(body["checks"]["telegram"]["status"], "healthy");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_api_v1_root() {
    let app = common::TestApp::new().await;

    let (status, body) = app.get("/api/v1").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Hackathon Platform API v1"));
}
