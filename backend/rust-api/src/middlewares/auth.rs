use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose, Engine as _};
use serde_json::json;
use std::sync::Arc;

use crate::services::AppState;

/// Decodes `Authorization: Basic ...` into `(user, password)`.
pub fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let auth_header = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = auth_header.strip_prefix("Basic ")?;
    let decoded = general_purpose::STANDARD.decode(encoded.trim()).ok()?;
    let credentials = String::from_utf8(decoded).ok()?;
    let (user, password) = credentials.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}

/// Compares without short-circuiting on the first differing byte.
pub fn password_matches(given: &str, expected: &str) -> bool {
    let (given, expected) = (given.as_bytes(), expected.as_bytes());
    given.len() == expected.len()
        && given
            .iter()
            .zip(expected)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

fn unauthorized(message: &str) -> Response {
    let mut response = (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "message": message,
            "status": 401
        })),
    )
        .into_response();
    response.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"admin\""),
    );
    response
}

/// Admin routes take HTTP Basic credentials; only the password is checked.
pub async fn admin_guard_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    let Some((user, password)) = basic_credentials(&headers) else {
        return unauthorized("Missing admin credentials");
    };

    if !password_matches(&password, &state.config.admin_password) {
        tracing::warn!(user = %user, path = %request.uri().path(), "Rejected admin request");
        return unauthorized("Invalid admin credentials");
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn decodes_basic_credentials() {
        let encoded = general_purpose::STANDARD.encode("admin:admin123");
        assert_eq!(
            basic_credentials(&headers(&format!("Basic {}", encoded))),
            Some(("admin".to_string(), "admin123".to_string()))
        );
        assert_eq!(basic_credentials(&headers("Bearer token")), None);
        assert_eq!(basic_credentials(&HeaderMap::new()), None);
    }

    #[test]
    fn password_comparison() {
        assert!(password_matches("admin123", "admin123"));
        assert!(!password_matches("admin124", "admin123"));
        assert!(!password_matches("admin", "admin123"));
    }
}
