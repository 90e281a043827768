use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde_json::json;
use tracing::info;

use crate::database::entities::{experiments, tiingo_fetches, workflow_outbox};
use crate::errors::{CoreError, CoreResult};
use crate::services::authorization::{AuthorizationService, Identity};
use crate::services::model_config::ModelConfig;
use crate::services::validation::{FetchParams, ValidationService};
use crate::workflow::{
    fetch_workflow_id, train_workflow_id, WorkflowClient, WorkflowError, FETCH_WORKFLOW,
    TRAIN_WORKFLOW,
};

/// Training runs and ad-hoc market-data fetches.
///
/// Training uses the outbox: the experiment row and its dispatch intent
/// commit in one transaction, and the dispatcher delivers the start to the
/// workflow engine afterwards. Fetches write nothing here and go straight
/// to the engine; their side records arrive from the workflow itself.
pub struct TrainingService {
    db: DatabaseConnection,
    auth: AuthorizationService,
    workflow_client: Arc<dyn WorkflowClient>,
    training_task_queue: String,
}

impl TrainingService {
    pub fn new(
        db: DatabaseConnection,
        workflow_client: Arc<dyn WorkflowClient>,
        training_task_queue: String,
    ) -> Self {
        let auth = AuthorizationService::new(db.clone());
        Self {
            db,
            auth,
            workflow_client,
            training_task_queue,
        }
    }

    pub async fn start_training(
        &self,
        identity: &Identity,
        project_id: i32,
        dataset_id: i32,
        model_config: &serde_json::Value,
    ) -> CoreResult<experiments::Model> {
        let project = self.auth.require_project(identity, project_id).await?;
        let dataset = self.auth.require_dataset(identity, dataset_id).await?;
        if dataset.project_id != project.id {
            return Err(CoreError::validation(
                "Dataset does not belong to the given project",
            ));
        }

        // Reject malformed configs before anything is written
        ModelConfig::from_value(model_config)?;
        let config_blob =
            serde_json::to_string(model_config).map_err(|e| CoreError::internal(e.to_string()))?;

        let workflow_id = train_workflow_id();

        let txn = self.db.begin().await.map_err(CoreError::from)?;

        let experiment = experiments::ActiveModel {
            project_id: Set(project.id),
            dataset_id: Set(Some(dataset.id)),
            workflow_id: Set(workflow_id.clone()),
            model_config: Set(config_blob),
            ..experiments::ActiveModel::new()
        }
        .insert(&txn)
        .await
        .map_err(CoreError::from)?;

        let payload = json!({
            "experiment_id": experiment.id,
            "project_id": project.id,
            "owner_id": identity.owner_id,
            "dataset_object_key": dataset.object_key,
            "model_config": model_config,
        });

        workflow_outbox::ActiveModel {
            workflow_id: Set(workflow_id.clone()),
            workflow_type: Set(TRAIN_WORKFLOW.to_string()),
            task_queue: Set(self.training_task_queue.clone()),
            payload: Set(payload.to_string()),
            ..workflow_outbox::ActiveModel::new()
        }
        .insert(&txn)
        .await
        .map_err(CoreError::from)?;

        txn.commit().await.map_err(CoreError::from)?;

        info!(
            experiment_id = experiment.id,
            workflow_id, "Queued training run"
        );
        Ok(experiment)
    }

    pub async fn list_experiments(
        &self,
        identity: &Identity,
        project_id: i32,
    ) -> CoreResult<Vec<experiments::Model>> {
        let project = self.auth.require_project(identity, project_id).await?;

        experiments::Entity::find()
            .filter(experiments::Column::ProjectId.eq(project.id))
            .order_by_desc(experiments::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(CoreError::from)
    }

    pub async fn get_experiment(
        &self,
        identity: &Identity,
        experiment_id: i32,
    ) -> CoreResult<experiments::Model> {
        self.auth.require_experiment(identity, experiment_id).await
    }

    /// Starts an external market-data fetch. Dispatched directly rather
    /// than through the outbox: there is no local row to keep consistent
    /// with it, and the caller learns immediately whether the engine
    /// accepted the request.
    pub async fn start_fetch(
        &self,
        identity: &Identity,
        project_id: i32,
        params: &FetchParams,
    ) -> CoreResult<String> {
        let project = self.auth.require_project(identity, project_id).await?;
        let params = ValidationService::validate_fetch_params(params)?;

        let workflow_id = fetch_workflow_id(
            project.id,
            &params.symbol,
            chrono::Utc::now().timestamp_millis(),
        );
        let payload = json!({
            "project_id": project.id,
            "owner_id": identity.owner_id,
            "data_type": params.data_type,
            "symbol": params.symbol,
            "start_date": params.start_date,
            "end_date": params.end_date,
            "frequency": params.frequency,
        });

        self.workflow_client
            .start_workflow(
                FETCH_WORKFLOW,
                &workflow_id,
                &self.training_task_queue,
                payload,
            )
            .await
            .map_err(|e| match e {
                WorkflowError::AlreadyStarted(id) => {
                    CoreError::conflict(format!("Fetch {} is already running", id))
                }
                other => {
                    CoreError::downstream("Could not start the data fetch").with_source(other)
                }
            })?;

        info!(project_id, workflow_id, "Started market-data fetch");
        Ok(workflow_id)
    }

    /// Fetch history for a project. The rows are written by the fetch
    /// workflow; this is a read-only view.
    pub async fn list_fetches(
        &self,
        identity: &Identity,
        project_id: i32,
    ) -> CoreResult<Vec<tiingo_fetches::Model>> {
        let project = self.auth.require_project(identity, project_id).await?;

        tiingo_fetches::Entity::find()
            .filter(tiingo_fetches::Column::ProjectId.eq(project.id))
            .order_by_desc(tiingo_fetches::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(CoreError::from)
    }
}
