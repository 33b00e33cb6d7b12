use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

use super::ApiError;
use crate::extractors::{AppJson, AppPath};
use crate::models::portfolio::{
    About, Experience, PortfolioRow, Project, ProjectCategory, ReorderRequest, Skill,
    SkillCategory,
};
use crate::services::AppState;

/// GET /api/v1/portfolio/{table}
pub async fn list_rows<R: PortfolioRow>(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<R>>, ApiError> {
    Ok(Json(state.portfolio.list::<R>().await?))
}

/// POST /admin/portfolio/{table}
pub async fn create_row<R: PortfolioRow>(
    State(state): State<Arc<AppState>>,
    AppJson(request): AppJson<R::Create>,
) -> Result<(StatusCode, Json<R>), ApiError> {
    let row = state.portfolio.create::<R>(request).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// PATCH /admin/portfolio/{table}/{id}
pub async fn update_row<R: PortfolioRow>(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<String>,
    AppJson(request): AppJson<R::Update>,
) -> Result<Json<R>, ApiError> {
    Ok(Json(state.portfolio.update::<R>(&id, request).await?))
}

/// DELETE /admin/portfolio/{table}/{id}
pub async fn delete_row<R: PortfolioRow>(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.portfolio.delete::<R>(&id).await?;
    Ok(Json(json!({ "deleted": id })))
}

/// POST /admin/portfolio/{table}/reorder
pub async fn reorder_rows<R: PortfolioRow>(
    State(state): State<Arc<AppState>>,
    AppJson(request): AppJson<ReorderRequest>,
) -> Result<Json<Vec<R>>, ApiError> {
    Ok(Json(state.portfolio.reorder::<R>(request).await?))
}

fn public_table<R: PortfolioRow>(router: Router<Arc<AppState>>) -> Router<Arc<AppState>> {
    router.route(&format!("/{}", R::TABLE.slug()), get(list_rows::<R>))
}

fn admin_table<R: PortfolioRow>(router: Router<Arc<AppState>>) -> Router<Arc<AppState>> {
    let base = format!("/{}", R::TABLE.slug());
    router
        .route(&base, get(list_rows::<R>).post(create_row::<R>))
        .route(&format!("{}/reorder", base), post(reorder_rows::<R>))
        .route(
            &format!("{}/{{id}}", base),
            patch(update_row::<R>).delete(delete_row::<R>),
        )
}

/// Read-only table listings, nested under `/api/v1/portfolio`.
pub fn public_routes() -> Router<Arc<AppState>> {
    let router = Router::new();
    let router = public_table::<About>(router);
    let router = public_table::<Experience>(router);
    let router = public_table::<Project>(router);
    let router = public_table::<ProjectCategory>(router);
    let router = public_table::<Skill>(router);
    public_table::<SkillCategory>(router)
}

/// Table editing, nested under `/admin/portfolio`.
pub fn admin_routes() -> Router<Arc<AppState>> {
    let router = Router::new();
    let router = admin_table::<About>(router);
    let router = admin_table::<Experience>(router);
    let router = admin_table::<Project>(router);
    let router = admin_table::<ProjectCategory>(router);
    let router = admin_table::<Skill>(router);
    admin_table::<SkillCategory>(router)
}
