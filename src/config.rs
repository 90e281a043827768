use std::env;

/// Object storage settings for the direct-upload protocol.
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub bucket: String,
    pub region: String,
    /// S3-compatible endpoint, e.g. `https://s3.amazonaws.com` or a local
    /// MinIO address.
    pub endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Validity window of pre-signed upload URLs, in seconds.
    pub upload_url_ttl_secs: u64,
    /// Interval of the orphaned-object reconciliation sweep, in seconds.
    pub sweep_interval_secs: u64,
    /// Minimum object age before the sweep may reclaim it, in seconds.
    /// Must comfortably exceed the upload URL TTL so in-flight uploads are
    /// never swept between PUT and finalize.
    pub sweep_grace_secs: u64,
}

impl StorageConfig {
    pub fn from_env() -> Self {
        Self {
            bucket: env_or("WORKBENCH_S3_BUCKET", "ml-workbench-datasets"),
            region: env_or("WORKBENCH_S3_REGION", "us-east-1"),
            endpoint: env_or("WORKBENCH_S3_ENDPOINT", "https://s3.amazonaws.com"),
            access_key_id: env_or("WORKBENCH_S3_ACCESS_KEY_ID", ""),
            secret_access_key: env_or("WORKBENCH_S3_SECRET_ACCESS_KEY", ""),
            upload_url_ttl_secs: env_parse("WORKBENCH_UPLOAD_URL_TTL_SECS", 600),
            sweep_interval_secs: env_parse("WORKBENCH_S3_SWEEP_INTERVAL_SECS", 3600),
            sweep_grace_secs: env_parse("WORKBENCH_S3_SWEEP_GRACE_SECS", 86400),
        }
    }
}

/// Workflow engine settings. Queue names match the workers registered
/// against the engine.
#[derive(Clone, Debug)]
pub struct WorkflowConfig {
    /// Base URL of the workflow engine's HTTP API.
    pub base_url: String,
    pub namespace: String,
    pub training_task_queue: String,
    pub serving_task_queue: String,
    /// Polling interval of the outbox dispatcher, in seconds.
    pub outbox_drain_interval_secs: u64,
}

impl WorkflowConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: env_or("WORKBENCH_WORKFLOW_ENGINE_URL", "http://localhost:7243"),
            namespace: env_or("WORKBENCH_WORKFLOW_NAMESPACE", "default"),
            training_task_queue: env_or(
                "WORKBENCH_TRAINING_TASK_QUEUE",
                "ml-training-task-queue",
            ),
            serving_task_queue: env_or("WORKBENCH_SERVING_TASK_QUEUE", "ml-serving-task-queue"),
            outbox_drain_interval_secs: env_parse("WORKBENCH_OUTBOX_DRAIN_INTERVAL_SECS", 5),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub workflow: WorkflowConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            storage: StorageConfig::from_env(),
            workflow: WorkflowConfig::from_env(),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_env() {
        let config = WorkflowConfig::from_env();
        assert_eq!(config.training_task_queue, "ml-training-task-queue");
        assert_eq!(config.serving_task_queue, "ml-serving-task-queue");
    }

    #[test]
    fn test_upload_ttl_default() {
        let config = StorageConfig::from_env();
        assert_eq!(config.upload_url_ttl_secs, 600);
    }
}
