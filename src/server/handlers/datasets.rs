use axum::extract::{Path, State};
use serde::Deserialize;

use crate::database::entities::datasets;
use crate::server::app::AppState;
use crate::server::response::{ApiResponse, ApiResult};
use crate::services::authorization::Identity;
use crate::services::dataset_service::UploadIntent;

#[derive(Deserialize)]
pub struct UploadIntentRequest {
    pub file_name: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
}

fn default_content_type() -> String {
    "application/octet-stream".to_string()
}

#[derive(Deserialize)]
pub struct FinalizeDatasetRequest {
    pub name: String,
    pub object_key: String,
}

pub async fn create_upload_intent(
    State(state): State<AppState>,
    identity: Identity,
    Path(project_id): Path<i32>,
    axum::Json(payload): axum::Json<UploadIntentRequest>,
) -> ApiResult<UploadIntent> {
    let intent = state
        .ctx
        .datasets()
        .create_upload_intent(
            &identity,
            project_id,
            &payload.file_name,
            &payload.content_type,
        )
        .await?;
    Ok(ApiResponse::ok("Upload URL created", intent))
}

pub async fn finalize_dataset(
    State(state): State<AppState>,
    identity: Identity,
    Path(project_id): Path<i32>,
    axum::Json(payload): axum::Json<FinalizeDatasetRequest>,
) -> ApiResult<datasets::Model> {
    let dataset = state
        .ctx
        .datasets()
        .finalize_dataset(&identity, project_id, &payload.name, &payload.object_key)
        .await?;
    Ok(ApiResponse::ok("Dataset registered", dataset))
}

pub async fn list_datasets(
    State(state): State<AppState>,
    identity: Identity,
    Path(project_id): Path<i32>,
) -> ApiResult<Vec<datasets::Model>> {
    let datasets = state
        .ctx
        .datasets()
        .list_datasets(&identity, project_id)
        .await?;
    Ok(ApiResponse::ok("Datasets retrieved", datasets))
}

pub async fn get_dataset(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i32>,
) -> ApiResult<datasets::Model> {
    let dataset = state.ctx.datasets().get_dataset(&identity, id).await?;
    Ok(ApiResponse::ok("Dataset retrieved", dataset))
}

pub async fn delete_dataset(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i32>,
) -> ApiResult<()> {
    state.ctx.datasets().delete_dataset(&identity, id).await?;
    Ok(ApiResponse::ok_empty("Dataset deleted"))
}
