#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose, Engine as _};
use portfolio_quiz_api::{config::Config, create_router, services::AppState};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

pub async fn create_test_app() -> Router {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let app_state = Arc::new(
        AppState::new(Config::in_memory())
            .await
            .expect("Failed to initialize test app state"),
    );

    create_router(app_state)
}

pub fn admin_auth(password: &str) -> String {
    format!(
        "Basic {}",
        general_purpose::STANDARD.encode(format!("admin:{}", password))
    )
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    authorization: Option<&str>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };

    TestResponse {
        status,
        headers,
        body,
    }
}

pub async fn send_with_header(app: &Router, uri: &str, name: &str, value: &str) -> TestResponse {
    let request = Request::builder()
        .uri(uri)
        .header(name, value)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    TestResponse {
        status: response.status(),
        headers: response.headers().clone(),
        body: Value::Null,
    }
}

pub async fn get(app: &Router, uri: &str) -> TestResponse {
    send(app, "GET", uri, None, None).await
}

pub async fn post(app: &Router, uri: &str, body: Option<Value>) -> TestResponse {
    send(app, "POST", uri, body, None).await
}

/// Lets a 3 s gate wait elapse under paused time and the worker apply it.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(3001)).await;
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}
