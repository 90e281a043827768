use axum::extract::{Path, State};

use crate::database::entities::deployments;
use crate::server::app::AppState;
use crate::server::response::{ApiResponse, ApiResult};
use crate::services::authorization::Identity;

pub async fn start_deployment(
    State(state): State<AppState>,
    identity: Identity,
    Path(experiment_id): Path<i32>,
) -> ApiResult<deployments::Model> {
    let deployment = state
        .ctx
        .deployments()
        .start_deployment(&identity, experiment_id)
        .await?;
    Ok(ApiResponse::ok("Deployment started", deployment))
}

pub async fn list_deployments(
    State(state): State<AppState>,
    identity: Identity,
    Path(experiment_id): Path<i32>,
) -> ApiResult<Vec<deployments::Model>> {
    let deployments = state
        .ctx
        .deployments()
        .list_deployments(&identity, experiment_id)
        .await?;
    Ok(ApiResponse::ok("Deployments retrieved", deployments))
}

pub async fn get_deployment(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i32>,
) -> ApiResult<deployments::Model> {
    let deployment = state.ctx.deployments().get_deployment(&identity, id).await?;
    Ok(ApiResponse::ok("Deployment retrieved", deployment))
}
