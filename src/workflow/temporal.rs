//! HTTP client for the Temporal workflow service.
//!
//! Starts workflow executions through Temporal's HTTP API; the engine
//! namespace isolates this deployment's workflows. The client is
//! fire-and-forget: a successful start response is all this core ever needs
//! from the engine.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, StatusCode};
use serde_json::json;
use uuid::Uuid;

use crate::config::WorkflowConfig;
use crate::workflow::{WorkflowClient, WorkflowError};

#[derive(Clone)]
pub struct TemporalClient {
    http_client: HttpClient,
    base_url: String,
    namespace: String,
}

impl TemporalClient {
    pub fn new(config: &WorkflowConfig) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            namespace: config.namespace.clone(),
        }
    }
}

#[async_trait]
impl WorkflowClient for TemporalClient {
    async fn start_workflow(
        &self,
        workflow_type: &str,
        workflow_id: &str,
        task_queue: &str,
        payload: serde_json::Value,
    ) -> Result<(), WorkflowError> {
        let url = format!(
            "{}/api/v1/namespaces/{}/workflows/{}",
            self.base_url, self.namespace, workflow_id
        );

        // requestId deduplicates retried HTTP calls on the engine side
        let body = json!({
            "workflowType": { "name": workflow_type },
            "taskQueue": { "name": task_queue },
            "input": [payload],
            "requestId": Uuid::new_v4().to_string(),
        });

        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .timeout(Duration::from_secs(10))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::info!(workflow_id, workflow_type, task_queue, "workflow started");
            return Ok(());
        }

        if status == StatusCode::CONFLICT {
            return Err(WorkflowError::AlreadyStarted(workflow_id.to_string()));
        }

        let body = response.text().await.unwrap_or_else(|_| "(no body)".to_string());
        Err(WorkflowError::Engine {
            status: status.as_u16(),
            body,
        })
    }
}
