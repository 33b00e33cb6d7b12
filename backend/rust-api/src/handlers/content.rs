use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use super::ApiError;
use crate::extractors::{AppJson, AppPath};
use crate::models::content::{ContactRequest, ContentSection};
use crate::services::AppState;

fn parse_section(slug: &str) -> Result<ContentSection, ApiError> {
    slug.parse::<ContentSection>().map_err(ApiError::not_found)
}

/// GET /api/v1/content/sections
pub async fn list_sections(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let mut sections = serde_json::Map::new();
    for section in ContentSection::ALL {
        sections.insert(
            section.slug().to_string(),
            state.content.section(section).await?,
        );
    }
    Ok(Json(Value::Object(sections)))
}

/// GET /api/v1/content/sections/{section}
pub async fn get_section(
    State(state): State<Arc<AppState>>,
    AppPath(slug): AppPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    let section = parse_section(&slug)?;
    Ok(Json(state.content.section(section).await?))
}

/// PUT /admin/content/{section}
pub async fn save_section(
    State(state): State<Arc<AppState>>,
    AppPath(slug): AppPath<String>,
    AppJson(body): AppJson<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let section = parse_section(&slug)?;
    Ok(Json(state.content.save_section(section, body).await?))
}

/// DELETE /admin/content/{section}
pub async fn reset_section(
    State(state): State<Arc<AppState>>,
    AppPath(slug): AppPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    let section = parse_section(&slug)?;
    Ok(Json(state.content.reset_section(section).await?))
}

/// POST /api/v1/content/contact
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    AppJson(request): AppJson<ContactRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let submission = state.content.submit_contact(request).await?;
    Ok((StatusCode::CREATED, Json(submission)))
}

/// GET /admin/contact-submissions
pub async fn list_contact_submissions(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.content.contact_submissions().await)
}

/// DELETE /admin/contact-submissions/{id}
pub async fn delete_contact_submission(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.content.delete_contact_submission(&id).await?;
    Ok(Json(json!({ "deleted": id })))
}
