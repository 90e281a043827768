use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde_json::json;
use tracing::info;

use crate::database::entities::common_types::ExperimentStatus;
use crate::database::entities::{deployments, workflow_outbox};
use crate::errors::{CoreError, CoreResult};
use crate::services::authorization::{AuthorizationService, Identity};
use crate::workflow::{deploy_workflow_id, DEPLOY_WORKFLOW};

/// Serving deployments for completed training runs.
pub struct DeploymentService {
    db: DatabaseConnection,
    auth: AuthorizationService,
    serving_task_queue: String,
}

impl DeploymentService {
    pub fn new(db: DatabaseConnection, serving_task_queue: String) -> Self {
        let auth = AuthorizationService::new(db.clone());
        Self {
            db,
            auth,
            serving_task_queue,
        }
    }

    /// Starts serving a trained model. Only a completed experiment can be
    /// deployed; anything else fails the precondition without creating a
    /// row. The deployment row and its dispatch intent commit together, and
    /// the workflow id carries the row id, so the intent cannot exist
    /// before the row it refers to.
    pub async fn start_deployment(
        &self,
        identity: &Identity,
        experiment_id: i32,
    ) -> CoreResult<deployments::Model> {
        let experiment = self.auth.require_experiment(identity, experiment_id).await?;

        if experiment.status != ExperimentStatus::Completed.as_str() {
            return Err(CoreError::precondition_failed(format!(
                "Experiment is {}, only completed experiments can be deployed",
                experiment.status
            )));
        }

        let txn = self.db.begin().await.map_err(CoreError::from)?;

        let deployment = deployments::ActiveModel {
            experiment_id: Set(experiment.id),
            ..deployments::ActiveModel::new()
        }
        .insert(&txn)
        .await
        .map_err(CoreError::from)?;

        let workflow_id = deploy_workflow_id(deployment.id);
        let payload = json!({
            "deployment_id": deployment.id,
            "experiment_id": experiment.id,
        });

        workflow_outbox::ActiveModel {
            workflow_id: Set(workflow_id.clone()),
            workflow_type: Set(DEPLOY_WORKFLOW.to_string()),
            task_queue: Set(self.serving_task_queue.clone()),
            payload: Set(payload.to_string()),
            ..workflow_outbox::ActiveModel::new()
        }
        .insert(&txn)
        .await
        .map_err(CoreError::from)?;

        txn.commit().await.map_err(CoreError::from)?;

        info!(
            deployment_id = deployment.id,
            experiment_id, workflow_id, "Queued deployment"
        );
        Ok(deployment)
    }

    pub async fn list_deployments(
        &self,
        identity: &Identity,
        experiment_id: i32,
    ) -> CoreResult<Vec<deployments::Model>> {
        let experiment = self.auth.require_experiment(identity, experiment_id).await?;

        deployments::Entity::find()
            .filter(deployments::Column::ExperimentId.eq(experiment.id))
            .order_by_desc(deployments::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(CoreError::from)
    }

    pub async fn get_deployment(
        &self,
        identity: &Identity,
        deployment_id: i32,
    ) -> CoreResult<deployments::Model> {
        self.auth.require_deployment(identity, deployment_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::entities::{datasets, experiments, projects};
    use crate::database::test_utils::setup_test_db;
    use crate::errors::CoreErrorKind;

    async fn seed_experiment(
        db: &DatabaseConnection,
        owner: &str,
        status: ExperimentStatus,
    ) -> experiments::Model {
        let project = projects::ActiveModel {
            name: Set("Alpha".to_string()),
            owner_id: Set(owner.to_string()),
            ..projects::ActiveModel::new()
        }
        .insert(db)
        .await
        .expect("insert project");

        let dataset = datasets::ActiveModel {
            project_id: Set(project.id),
            name: Set("prices.csv".to_string()),
            object_key: Set(format!("{}/{}/prices.csv", owner, project.id)),
            ..datasets::ActiveModel::new()
        }
        .insert(db)
        .await
        .expect("insert dataset");

        experiments::ActiveModel {
            project_id: Set(project.id),
            dataset_id: Set(Some(dataset.id)),
            workflow_id: Set(format!("train-{}", owner)),
            status: Set(status.as_str().to_string()),
            model_config: Set("{\"model_name\":\"lstm\"}".to_string()),
            ..experiments::ActiveModel::new()
        }
        .insert(db)
        .await
        .expect("insert experiment")
    }

    #[tokio::test]
    async fn test_deploying_completed_experiment_queues_workflow() {
        let db = setup_test_db().await;
        let experiment = seed_experiment(&db, "u1", ExperimentStatus::Completed).await;
        let svc = DeploymentService::new(db.clone(), "ml-serving-task-queue".to_string());

        let deployment = svc
            .start_deployment(&Identity::user("u1"), experiment.id)
            .await
            .expect("start deployment");
        assert_eq!(deployment.status, "deploying");

        let outbox = workflow_outbox::Entity::find()
            .all(&db)
            .await
            .expect("query");
        assert_eq!(outbox.len(), 1);
        assert_eq!(outbox[0].workflow_id, format!("deploy-{}", deployment.id));
        assert_eq!(outbox[0].workflow_type, DEPLOY_WORKFLOW);
        assert_eq!(outbox[0].task_queue, "ml-serving-task-queue");

        let payload: serde_json::Value =
            serde_json::from_str(&outbox[0].payload).expect("payload json");
        assert_eq!(payload["deployment_id"], deployment.id);
        assert_eq!(payload["experiment_id"], experiment.id);
    }

    #[tokio::test]
    async fn test_incomplete_experiment_fails_precondition_without_rows() {
        let db = setup_test_db().await;
        let experiment = seed_experiment(&db, "u1", ExperimentStatus::Running).await;
        let svc = DeploymentService::new(db.clone(), "ml-serving-task-queue".to_string());

        let err = svc
            .start_deployment(&Identity::user("u1"), experiment.id)
            .await
            .expect_err("running experiment");
        assert_eq!(err.kind(), CoreErrorKind::PreconditionFailed);

        assert!(deployments::Entity::find()
            .all(&db)
            .await
            .expect("query")
            .is_empty());
        assert!(workflow_outbox::Entity::find()
            .all(&db)
            .await
            .expect("query")
            .is_empty());
    }

    #[tokio::test]
    async fn test_non_owner_cannot_deploy() {
        let db = setup_test_db().await;
        let experiment = seed_experiment(&db, "u1", ExperimentStatus::Completed).await;
        let svc = DeploymentService::new(db, "ml-serving-task-queue".to_string());

        let err = svc
            .start_deployment(&Identity::user("u2"), experiment.id)
            .await
            .expect_err("non-owner");
        assert_eq!(err.kind(), CoreErrorKind::NotFoundOrForbidden);
    }

    #[tokio::test]
    async fn test_deployment_guard_walks_ownership_chain() {
        let db = setup_test_db().await;
        let experiment = seed_experiment(&db, "u1", ExperimentStatus::Completed).await;
        let svc = DeploymentService::new(db, "ml-serving-task-queue".to_string());

        let deployment = svc
            .start_deployment(&Identity::user("u1"), experiment.id)
            .await
            .expect("start deployment");

        let found = svc
            .get_deployment(&Identity::user("u1"), deployment.id)
            .await
            .expect("owner reads deployment");
        assert_eq!(found.id, deployment.id);

        let err = svc
            .get_deployment(&Identity::user("u2"), deployment.id)
            .await
            .expect_err("non-owner read");
        assert_eq!(err.kind(), CoreErrorKind::NotFoundOrForbidden);
    }
}
