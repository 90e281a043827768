//! Outbox drain loop.
//!
//! Experiment and deployment rows are committed together with an outbox row
//! describing the workflow to start. This dispatcher owns the second half of
//! that contract: it polls pending rows, calls the engine, and marks a row
//! `dispatched` only on acknowledgment. A row whose earlier attempt actually
//! reached the engine comes back as `AlreadyStarted` and is settled the same
//! way, so redelivery is idempotent.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::database::entities::common_types::OutboxStatus;
use crate::database::entities::workflow_outbox;
use crate::errors::{CoreError, CoreResult};
use crate::workflow::{WorkflowClient, WorkflowError};

const DRAIN_BATCH_SIZE: u64 = 16;

pub struct OutboxDispatcher {
    db: DatabaseConnection,
    client: Arc<dyn WorkflowClient>,
    interval: Duration,
}

impl OutboxDispatcher {
    pub fn new(db: DatabaseConnection, client: Arc<dyn WorkflowClient>, interval: Duration) -> Self {
        Self {
            db,
            client,
            interval,
        }
    }

    /// Spawns the periodic drain task. Runs for the lifetime of the process;
    /// a failed pass is logged and retried on the next tick.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            interval.tick().await;

            loop {
                interval.tick().await;
                match self.drain_once().await {
                    Ok(0) => {}
                    Ok(count) => tracing::debug!(count, "outbox rows dispatched"),
                    Err(e) => tracing::error!(error = %e, "outbox drain failed"),
                }
            }
        })
    }

    /// Dispatches one batch of pending rows. Returns how many rows were
    /// settled as dispatched.
    pub async fn drain_once(&self) -> CoreResult<usize> {
        let pending = workflow_outbox::Entity::find()
            .filter(workflow_outbox::Column::Status.eq(OutboxStatus::Pending.as_str()))
            .order_by_asc(workflow_outbox::Column::Id)
            .limit(DRAIN_BATCH_SIZE)
            .all(&self.db)
            .await
            .map_err(CoreError::from)?;

        let mut dispatched = 0;
        for row in pending {
            // A row that cannot be parsed must not abort the pass, or it
            // blocks every row behind it on every subsequent tick
            let payload: serde_json::Value = match serde_json::from_str(&row.payload) {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::error!(
                        workflow_id = %row.workflow_id,
                        error = %e,
                        "malformed outbox payload, skipping row"
                    );
                    let mut active: workflow_outbox::ActiveModel = row.clone().into();
                    active.attempts = Set(row.attempts + 1);
                    active.last_error = Set(Some(format!("malformed payload: {}", e)));
                    active.update(&self.db).await.map_err(CoreError::from)?;
                    continue;
                }
            };

            let result = self
                .client
                .start_workflow(&row.workflow_type, &row.workflow_id, &row.task_queue, payload)
                .await;

            let mut active: workflow_outbox::ActiveModel = row.clone().into();
            match result {
                Ok(()) | Err(WorkflowError::AlreadyStarted(_)) => {
                    active.status = Set(OutboxStatus::Dispatched.as_str().to_string());
                    active.dispatched_at = Set(Some(Utc::now()));
                    active.last_error = Set(None);
                    active.update(&self.db).await.map_err(CoreError::from)?;
                    dispatched += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        workflow_id = %row.workflow_id,
                        attempts = row.attempts + 1,
                        error = %e,
                        "workflow dispatch failed, will retry"
                    );
                    active.attempts = Set(row.attempts + 1);
                    active.last_error = Set(Some(e.to_string()));
                    active.update(&self.db).await.map_err(CoreError::from)?;
                }
            }
        }

        Ok(dispatched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_utils::setup_test_db;
    use crate::workflow::MockWorkflowClient;
    use sea_orm::ActiveValue;

    async fn insert_pending(db: &DatabaseConnection, workflow_id: &str) -> workflow_outbox::Model {
        workflow_outbox::ActiveModel {
            workflow_id: Set(workflow_id.to_string()),
            workflow_type: Set("TrainModelWorkflow".to_string()),
            task_queue: Set("ml-training-task-queue".to_string()),
            payload: Set(r#"{"experiment_id":1}"#.to_string()),
            ..workflow_outbox::ActiveModel::new()
        }
        .insert(db)
        .await
        .expect("insert outbox row")
    }

    #[tokio::test]
    async fn test_drain_marks_rows_dispatched_on_ack() {
        let db = setup_test_db().await;
        insert_pending(&db, "train-a").await;
        insert_pending(&db, "train-b").await;

        let client = Arc::new(MockWorkflowClient::new());
        let dispatcher =
            OutboxDispatcher::new(db.clone(), client.clone(), Duration::from_secs(5));

        let settled = dispatcher.drain_once().await.expect("drain should succeed");
        assert_eq!(settled, 2);
        assert_eq!(client.started_ids(), vec!["train-a", "train-b"]);

        let remaining = workflow_outbox::Entity::find()
            .filter(workflow_outbox::Column::Status.eq("pending"))
            .all(&db)
            .await
            .expect("query outbox");
        assert!(remaining.is_empty());
    }

    #[tokio::test]
    async fn test_failed_dispatch_is_retained_with_attempt_count() {
        let db = setup_test_db().await;
        insert_pending(&db, "train-a").await;

        let dispatcher = OutboxDispatcher::new(
            db.clone(),
            Arc::new(MockWorkflowClient::failing()),
            Duration::from_secs(5),
        );

        let settled = dispatcher.drain_once().await.expect("drain should succeed");
        assert_eq!(settled, 0);

        let row = workflow_outbox::Entity::find()
            .one(&db)
            .await
            .expect("query outbox")
            .expect("row still present");
        assert_eq!(row.status, "pending");
        assert_eq!(row.attempts, 1);
        assert!(row.last_error.is_some());
        assert!(row.dispatched_at.is_none());
    }

    #[tokio::test]
    async fn test_already_started_is_settled_as_dispatched() {
        let db = setup_test_db().await;
        insert_pending(&db, "train-a").await;

        let dispatcher = OutboxDispatcher::new(
            db.clone(),
            Arc::new(MockWorkflowClient::already_started()),
            Duration::from_secs(5),
        );

        let settled = dispatcher.drain_once().await.expect("drain should succeed");
        assert_eq!(settled, 1);

        let row = workflow_outbox::Entity::find()
            .one(&db)
            .await
            .expect("query outbox")
            .expect("row present");
        assert_eq!(row.status, "dispatched");
        assert!(row.dispatched_at.is_some());
    }

    #[tokio::test]
    async fn test_malformed_payload_does_not_block_later_rows() {
        let db = setup_test_db().await;
        workflow_outbox::ActiveModel {
            workflow_id: Set("train-bad".to_string()),
            workflow_type: Set("TrainModelWorkflow".to_string()),
            task_queue: Set("ml-training-task-queue".to_string()),
            payload: Set("not json".to_string()),
            ..workflow_outbox::ActiveModel::new()
        }
        .insert(&db)
        .await
        .expect("insert outbox row");
        insert_pending(&db, "train-good").await;

        let client = Arc::new(MockWorkflowClient::new());
        let dispatcher =
            OutboxDispatcher::new(db.clone(), client.clone(), Duration::from_secs(5));

        // Two passes: the poisoned row must not wedge either of them
        dispatcher.drain_once().await.expect("drain should succeed");
        dispatcher.drain_once().await.expect("drain should succeed");
        assert_eq!(client.started_ids(), vec!["train-good"]);

        let rows = workflow_outbox::Entity::find()
            .order_by_asc(workflow_outbox::Column::Id)
            .all(&db)
            .await
            .expect("query outbox");
        assert_eq!(rows[0].status, "pending");
        assert_eq!(rows[0].attempts, 2);
        assert!(rows[0]
            .last_error
            .as_deref()
            .is_some_and(|e| e.contains("malformed payload")));
        assert_eq!(rows[1].status, "dispatched");
    }

    #[tokio::test]
    async fn test_drain_skips_dispatched_rows() {
        let db = setup_test_db().await;
        let row = insert_pending(&db, "train-a").await;

        let mut active: workflow_outbox::ActiveModel = row.into();
        active.status = Set("dispatched".to_string());
        active.dispatched_at = Set(Some(Utc::now()));
        active.last_error = ActiveValue::NotSet;
        active.update(&db).await.expect("mark dispatched");

        let client = Arc::new(MockWorkflowClient::new());
        let dispatcher =
            OutboxDispatcher::new(db.clone(), client.clone(), Duration::from_secs(5));
        let settled = dispatcher.drain_once().await.expect("drain should succeed");
        assert_eq!(settled, 0);
        assert!(client.started_ids().is_empty());
    }
}
