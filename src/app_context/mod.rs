use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::services::{
    dataset_service::DatasetService, deployment_service::DeploymentService,
    project_service::ProjectService, training_service::TrainingService,
};
use crate::storage::ObjectStore;
use crate::workflow::WorkflowClient;

/// Shared application context exposing core services to the HTTP layer.
#[derive(Clone)]
pub struct AppContext {
    db: DatabaseConnection,
    project_service: Arc<ProjectService>,
    dataset_service: Arc<DatasetService>,
    training_service: Arc<TrainingService>,
    deployment_service: Arc<DeploymentService>,
}

impl AppContext {
    pub fn new(
        db: DatabaseConnection,
        storage: Arc<dyn ObjectStore>,
        workflow_client: Arc<dyn WorkflowClient>,
        config: &AppConfig,
    ) -> Self {
        let project_service = Arc::new(ProjectService::new(db.clone()));
        let dataset_service = Arc::new(DatasetService::new(
            db.clone(),
            storage,
            config.storage.upload_url_ttl_secs,
        ));
        let training_service = Arc::new(TrainingService::new(
            db.clone(),
            workflow_client,
            config.workflow.training_task_queue.clone(),
        ));
        let deployment_service = Arc::new(DeploymentService::new(
            db.clone(),
            config.workflow.serving_task_queue.clone(),
        ));

        Self {
            db,
            project_service,
            dataset_service,
            training_service,
            deployment_service,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn projects(&self) -> &ProjectService {
        &self.project_service
    }

    pub fn datasets(&self) -> &DatasetService {
        &self.dataset_service
    }

    pub fn training(&self) -> &TrainingService {
        &self.training_service
    }

    pub fn deployments(&self) -> &DeploymentService {
        &self.deployment_service
    }
}
