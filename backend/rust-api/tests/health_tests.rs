use axum::http::{header, StatusCode};
use base64::{engine::general_purpose, Engine as _};

mod common;

use common::{get, send};

#[tokio::test]
async fn test_health_reports_memory_stores() {
    let app = common::create_test_app().await;

    let response = get(&app, "/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "healthy");
    for store in ["game_state", "content", "portfolio"] {
        assert_eq!(response.body["dependencies"][store]["backend"], "memory");
        assert_eq!(response.body["dependencies"][store]["status"], "healthy");
    }
    assert!(response.headers.contains_key("x-trace-id"));
    assert!(response.headers.contains_key(header::CONTENT_SECURITY_POLICY));
}

#[tokio::test]
async fn test_metrics_require_credentials() {
    let app = common::create_test_app().await;

    let anonymous = get(&app, "/metrics").await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let auth = format!(
        "Basic {}",
        general_purpose::STANDARD.encode("admin:changeme")
    );
    get(&app, "/api/v1/quiz/catalog").await;
    let response = send(&app, "GET", "/metrics", None, Some(&auth)).await;
    assert_eq!(response.status, StatusCode::OK);
    let text = response.body.as_str().unwrap();
    assert!(text.contains("http_requests_total"));
}

#[tokio::test]
async fn test_trace_id_is_echoed() {
    let app = common::create_test_app().await;

    let response = common::send_with_header(&app, "/health", "x-trace-id", "trace-abc").await;
    assert_eq!(response.headers["x-trace-id"], "trace-abc");
}
