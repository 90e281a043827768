use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};

use crate::database::entities::{experiments, tiingo_fetches};
use crate::server::app::AppState;
use crate::server::response::{ApiResponse, ApiResult};
use crate::services::authorization::Identity;
use crate::services::validation::FetchParams;

#[derive(Deserialize)]
pub struct StartTrainingRequest {
    pub dataset_id: i32,
    pub model_config: serde_json::Value,
}

#[derive(Serialize)]
pub struct StartFetchResponse {
    pub workflow_id: String,
}

pub async fn start_training(
    State(state): State<AppState>,
    identity: Identity,
    Path(project_id): Path<i32>,
    axum::Json(payload): axum::Json<StartTrainingRequest>,
) -> ApiResult<experiments::Model> {
    let experiment = state
        .ctx
        .training()
        .start_training(
            &identity,
            project_id,
            payload.dataset_id,
            &payload.model_config,
        )
        .await?;
    Ok(ApiResponse::ok("Training started", experiment))
}

pub async fn list_experiments(
    State(state): State<AppState>,
    identity: Identity,
    Path(project_id): Path<i32>,
) -> ApiResult<Vec<experiments::Model>> {
    let experiments = state
        .ctx
        .training()
        .list_experiments(&identity, project_id)
        .await?;
    Ok(ApiResponse::ok("Experiments retrieved", experiments))
}

pub async fn get_experiment(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i32>,
) -> ApiResult<experiments::Model> {
    let experiment = state.ctx.training().get_experiment(&identity, id).await?;
    Ok(ApiResponse::ok("Experiment retrieved", experiment))
}

pub async fn start_fetch(
    State(state): State<AppState>,
    identity: Identity,
    Path(project_id): Path<i32>,
    axum::Json(params): axum::Json<FetchParams>,
) -> ApiResult<StartFetchResponse> {
    let workflow_id = state
        .ctx
        .training()
        .start_fetch(&identity, project_id, &params)
        .await?;
    Ok(ApiResponse::ok(
        "Data fetch started",
        StartFetchResponse { workflow_id },
    ))
}

pub async fn list_fetches(
    State(state): State<AppState>,
    identity: Identity,
    Path(project_id): Path<i32>,
) -> ApiResult<Vec<tiingo_fetches::Model>> {
    let fetches = state
        .ctx
        .training()
        .list_fetches(&identity, project_id)
        .await?;
    Ok(ApiResponse::ok("Fetch history retrieved", fetches))
}
