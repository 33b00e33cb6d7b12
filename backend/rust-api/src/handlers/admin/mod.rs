use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use super::ApiError;
use crate::extractors::AppJson;
use crate::middlewares::auth::password_matches;
use crate::services::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

/// POST /api/v1/admin/login
///
/// Lets the admin panel check a password before it starts sending Basic
/// credentials with every request. Nothing is issued on success.
pub async fn login(
    State(state): State<Arc<AppState>>,
    AppJson(request): AppJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !password_matches(&request.password, &state.config.admin_password) {
        tracing::warn!("Admin login rejected");
        return Err(ApiError::Unauthorized("Invalid password".to_string()));
    }

    tracing::info!("Admin login accepted");
    Ok(Json(json!({ "authenticated": true })))
}
