//! Workflow engine integration.
//!
//! The engine is an external collaborator: this core starts uniquely
//! identified workflows on named task queues and never executes or tracks
//! their logic. The engine is the source of truth for execution progress.

pub mod outbox;
pub mod temporal;

pub use outbox::OutboxDispatcher;
pub use temporal::TemporalClient;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub const TRAIN_WORKFLOW: &str = "TrainModelWorkflow";
pub const DEPLOY_WORKFLOW: &str = "DeployModelWorkflow";
pub const FETCH_WORKFLOW: &str = "FetchDataWorkflow";

#[derive(Debug, Error)]
pub enum WorkflowError {
    /// A workflow with this id is already running or finished. Dispatch ids
    /// are unique per attempt, so on redelivery this means the earlier
    /// attempt reached the engine and the start can be treated as done.
    #[error("workflow {0} already started")]
    AlreadyStarted(String),
    #[error("workflow engine request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("workflow engine returned {status}: {body}")]
    Engine { status: u16, body: String },
}

/// Fire-and-forget workflow trigger.
#[async_trait]
pub trait WorkflowClient: Send + Sync {
    async fn start_workflow(
        &self,
        workflow_type: &str,
        workflow_id: &str,
        task_queue: &str,
        payload: serde_json::Value,
    ) -> Result<(), WorkflowError>;
}

/// `train-{uuid}`: unique per dispatch attempt, not per logical request.
pub fn train_workflow_id() -> String {
    format!("train-{}", Uuid::new_v4())
}

/// `deploy-{deployment_row_id}`.
pub fn deploy_workflow_id(deployment_id: i32) -> String {
    format!("deploy-{}", deployment_id)
}

/// `fetch-{project_id}-{symbol}-{unix_millis}`.
pub fn fetch_workflow_id(project_id: i32, symbol: &str, timestamp_millis: i64) -> String {
    format!("fetch-{}-{}-{}", project_id, symbol, timestamp_millis)
}

// Re-export MockWorkflowClient for tests and local development
pub use mock::MockWorkflowClient;

mod mock {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Debug, PartialEq)]
    pub struct StartedWorkflow {
        pub workflow_type: String,
        pub workflow_id: String,
        pub task_queue: String,
        pub payload: serde_json::Value,
    }

    /// Records every start request instead of talking to an engine. Can be
    /// switched into a failing or already-started mode to exercise the
    /// dispatcher's retry and idempotency handling.
    pub struct MockWorkflowClient {
        pub started: Arc<Mutex<Vec<StartedWorkflow>>>,
        mode: Mode,
    }

    #[derive(Clone, Copy)]
    enum Mode {
        Ok,
        Fail,
        AlreadyStarted,
    }

    impl MockWorkflowClient {
        pub fn new() -> Self {
            Self {
                started: Arc::new(Mutex::new(Vec::new())),
                mode: Mode::Ok,
            }
        }

        pub fn failing() -> Self {
            Self {
                started: Arc::new(Mutex::new(Vec::new())),
                mode: Mode::Fail,
            }
        }

        pub fn already_started() -> Self {
            Self {
                started: Arc::new(Mutex::new(Vec::new())),
                mode: Mode::AlreadyStarted,
            }
        }

        pub fn started_ids(&self) -> Vec<String> {
            self.started
                .lock()
                .expect("mock lock poisoned")
                .iter()
                .map(|w| w.workflow_id.clone())
                .collect()
        }
    }

    impl Default for MockWorkflowClient {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl WorkflowClient for MockWorkflowClient {
        async fn start_workflow(
            &self,
            workflow_type: &str,
            workflow_id: &str,
            task_queue: &str,
            payload: serde_json::Value,
        ) -> Result<(), WorkflowError> {
            match self.mode {
                Mode::Fail => Err(WorkflowError::Engine {
                    status: 503,
                    body: "engine unavailable".to_string(),
                }),
                Mode::AlreadyStarted => Err(WorkflowError::AlreadyStarted(
                    workflow_id.to_string(),
                )),
                Mode::Ok => {
                    self.started
                        .lock()
                        .expect("mock lock poisoned")
                        .push(StartedWorkflow {
                            workflow_type: workflow_type.to_string(),
                            workflow_id: workflow_id.to_string(),
                            task_queue: task_queue.to_string(),
                            payload,
                        });
                    Ok(())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_id_formats() {
        let train = train_workflow_id();
        assert!(train.starts_with("train-"));
        assert_eq!(train.len(), "train-".len() + 36);

        assert_eq!(deploy_workflow_id(42), "deploy-42");
        assert_eq!(
            fetch_workflow_id(7, "btcusd", 1755000000000),
            "fetch-7-btcusd-1755000000000"
        );
    }

    #[test]
    fn test_train_ids_are_unique_per_attempt() {
        assert_ne!(train_workflow_id(), train_workflow_id());
    }
}
