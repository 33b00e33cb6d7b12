use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::metrics;
use crate::middlewares::auth::basic_credentials;
use crate::models::NavigationNotice;
use crate::services::content_service::ContentError;
use crate::services::page_controller::NavigationError;
use crate::services::portfolio_service::PortfolioError;
use crate::services::quiz_service::QuizError;
use crate::services::AppState;

pub mod admin;
pub mod content;
pub mod portfolio;
pub mod quiz;
pub mod sse;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    Conflict(String),
    /// 303 to a client route, with the notice to show there.
    Redirect(NavigationNotice),
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(format!("{:#}", err))
    }
}

impl From<QuizError> for ApiError {
    fn from(err: QuizError) -> Self {
        match err {
            QuizError::Navigation(NavigationError::Redirect(notice)) => ApiError::Redirect(notice),
            QuizError::Navigation(e @ NavigationError::PageNotFound(_)) => {
                ApiError::NotFound(e.to_string())
            }
            QuizError::Navigation(e) => ApiError::Conflict(e.to_string()),
            e @ QuizError::UnknownTask { .. } => ApiError::NotFound(e.to_string()),
            e @ (QuizError::InvalidClientId | QuizError::InvalidSubmission(_)) => {
                ApiError::BadRequest(e.to_string())
            }
        }
    }
}

impl From<ContentError> for ApiError {
    fn from(err: ContentError) -> Self {
        match err {
            e @ (ContentError::Malformed(_) | ContentError::Validation(_)) => {
                ApiError::BadRequest(e.to_string())
            }
            e @ ContentError::SubmissionNotFound(_) => ApiError::NotFound(e.to_string()),
            ContentError::Storage(e) => e.into(),
        }
    }
}

impl From<PortfolioError> for ApiError {
    fn from(err: PortfolioError) -> Self {
        match err {
            e @ PortfolioError::NotFound { .. } => ApiError::NotFound(e.to_string()),
            PortfolioError::Storage(e) => e.into(),
            e => ApiError::BadRequest(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, message),
            ApiError::Redirect(notice) => return redirect_response(notice),
            ApiError::Internal(message) => {
                tracing::error!("Internal error: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };
        let json_response = json!({
            "message": message,
            "status": status.as_u16()
        });
        (status, Json(json_response)).into_response()
    }
}

fn redirect_response(notice: NavigationNotice) -> Response {
    let status = StatusCode::SEE_OTHER;
    let body = json!({
        "message": notice.message,
        "redirectTo": notice.redirect_to,
        "status": status.as_u16()
    });
    let mut response = (status, Json(body)).into_response();
    if let Ok(location) = HeaderValue::from_str(&notice.redirect_to.path()) {
        response.headers_mut().insert(header::LOCATION, location);
    }
    response
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut dependencies = serde_json::Map::new();

    let checks = [
        (
            "game_state",
            state.quiz.store_backend(),
            check_store(state.quiz.ping_store()).await,
        ),
        (
            "content",
            state.content.store_backend(),
            check_store(state.content.ping_store()).await,
        ),
        (
            "portfolio",
            state.portfolio.store_backend(),
            check_store(state.portfolio.ping_store()).await,
        ),
    ];

    let mut all_healthy = true;
    for (name, backend, result) in checks {
        let mut entry = serde_json::Map::new();
        entry.insert("backend".to_string(), json!(backend));
        match result {
            Ok(()) => {
                entry.insert("status".to_string(), json!("healthy"));
            }
            Err(error) => {
                all_healthy = false;
                entry.insert("status".to_string(), json!("unhealthy"));
                entry.insert("error".to_string(), json!(error));
            }
        }
        dependencies.insert(name.to_string(), serde_json::Value::Object(entry));
    }

    let (status_code, status) = if all_healthy {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status_code,
        Json(json!({
            "status": status,
            "service": "portfolio-quiz-api",
            "version": env!("CARGO_PKG_VERSION"),
            "dependencies": dependencies
        })),
    )
}

async fn check_store<F>(ping: F) -> Result<(), String>
where
    F: Future<Output = anyhow::Result<()>>,
{
    match tokio::time::timeout(Duration::from_secs(1), ping).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(format!("{:#}", e)),
        Err(_) => Err("timeout after 1s".to_string()),
    }
}

pub async fn metrics_handler() -> impl IntoResponse {
    match metrics::render_metrics() {
        Ok(metrics_text) => (StatusCode::OK, metrics_text),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to render metrics: {}", e),
        ),
    }
}

/// Protects `/metrics` with the configured `user:password` pair.
pub async fn metrics_auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let (user, password) = basic_credentials(&headers).ok_or(StatusCode::UNAUTHORIZED)?;

    if format!("{}:{}", user, password) != state.config.metrics_auth {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(next.run(request).await)
}
