use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;

use super::ApiError;
use crate::extractors::{AppJson, AppPath};
use crate::models::quiz::AdblockReport;
use crate::models::Submission;
use crate::services::AppState;

/// GET /api/v1/quiz/catalog
pub async fn catalog(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.quiz.catalog_overview())
}

/// GET /api/v1/quiz/{client_id}/state
pub async fn get_state(
    State(state): State<Arc<AppState>>,
    AppPath(client_id): AppPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.quiz.state(&client_id).await?))
}

/// POST /api/v1/quiz/{client_id}/start
pub async fn start_game(
    State(state): State<Arc<AppState>>,
    AppPath(client_id): AppPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.quiz.start(&client_id).await?))
}

/// POST /api/v1/quiz/{client_id}/reset
pub async fn reset_game(
    State(state): State<Arc<AppState>>,
    AppPath(client_id): AppPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.quiz.reset(&client_id).await?))
}

/// POST /api/v1/quiz/{client_id}/adblock
pub async fn report_adblock(
    State(state): State<Arc<AppState>>,
    AppPath(client_id): AppPath<String>,
    AppJson(report): AppJson<AdblockReport>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(
        state.quiz.set_adblock(&client_id, report.detected).await?,
    ))
}

/// GET /api/v1/quiz/{client_id}/pages/{page}
pub async fn enter_page(
    State(state): State<Arc<AppState>>,
    AppPath((client_id, page)): AppPath<(String, u32)>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.quiz.enter_page(&client_id, page).await?))
}

/// POST /api/v1/quiz/{client_id}/pages/{page}/tasks/{task_id}/answers
///
/// Premature or repeated submissions are not errors: they come back with
/// `accepted: false` and the reason.
pub async fn submit_answer(
    State(state): State<Arc<AppState>>,
    AppPath((client_id, page, task_id)): AppPath<(String, u32, String)>,
    AppJson(submission): AppJson<Submission>,
) -> Result<impl IntoResponse, ApiError> {
    let response = state
        .quiz
        .submit_answer(&client_id, page, &task_id, submission)
        .await?;
    Ok(Json(response))
}

/// POST /api/v1/quiz/{client_id}/pages/{page}/next
pub async fn next_page(
    State(state): State<Arc<AppState>>,
    AppPath((client_id, page)): AppPath<(String, u32)>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.quiz.next_page(&client_id, page).await?))
}

/// POST /api/v1/quiz/{client_id}/pages/{page}/back
pub async fn previous_page(
    State(state): State<Arc<AppState>>,
    AppPath((client_id, page)): AppPath<(String, u32)>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.quiz.previous_page(&client_id, page).await?))
}

/// GET /api/v1/quiz/{client_id}/score
pub async fn score(
    State(state): State<Arc<AppState>>,
    AppPath(client_id): AppPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.quiz.score(&client_id).await?))
}
