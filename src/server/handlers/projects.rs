use axum::extract::{Path, State};
use serde::Deserialize;

use crate::database::entities::projects;
use crate::server::app::AppState;
use crate::server::response::{ApiResponse, ApiResult};
use crate::services::authorization::Identity;
use crate::services::project_service::{DashboardCounts, ProjectStats};

#[derive(Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
}

pub async fn create_project(
    State(state): State<AppState>,
    identity: Identity,
    axum::Json(payload): axum::Json<CreateProjectRequest>,
) -> ApiResult<projects::Model> {
    let project = state
        .ctx
        .projects()
        .create_project(&identity, &payload.name)
        .await?;
    Ok(ApiResponse::ok("Project created", project))
}

pub async fn list_projects(
    State(state): State<AppState>,
    identity: Identity,
) -> ApiResult<Vec<projects::Model>> {
    let projects = state.ctx.projects().list_projects(&identity).await?;
    Ok(ApiResponse::ok("Projects retrieved", projects))
}

pub async fn get_project(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i32>,
) -> ApiResult<projects::Model> {
    let project = state.ctx.projects().get_project(&identity, id).await?;
    Ok(ApiResponse::ok("Project retrieved", project))
}

pub async fn delete_project(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i32>,
) -> ApiResult<()> {
    state.ctx.projects().delete_project(&identity, id).await?;
    Ok(ApiResponse::ok_empty("Project deleted"))
}

pub async fn project_stats(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i32>,
) -> ApiResult<ProjectStats> {
    let stats = state.ctx.projects().project_stats(&identity, id).await?;
    Ok(ApiResponse::ok("Project stats retrieved", stats))
}

pub async fn dashboard_counts(
    State(state): State<AppState>,
    identity: Identity,
) -> ApiResult<DashboardCounts> {
    let counts = state.ctx.projects().dashboard_counts(&identity).await?;
    Ok(ApiResponse::ok("Dashboard counts retrieved", counts))
}
