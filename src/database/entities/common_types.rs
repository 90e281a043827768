use crate::errors::{CoreError, CoreResult};

/// Dataset lifecycle status. `Uploading` is conceptual only: datasets are
/// inserted as `Ready` once the client reports a finished upload, or as
/// whatever the external ingestion workflow writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetStatus {
    Uploading,
    Ready,
    Error,
}

impl DatasetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetStatus::Uploading => "uploading",
            DatasetStatus::Ready => "ready",
            DatasetStatus::Error => "error",
        }
    }

    pub fn parse(s: &str) -> CoreResult<Self> {
        match s {
            "uploading" => Ok(DatasetStatus::Uploading),
            "ready" => Ok(DatasetStatus::Ready),
            "error" => Ok(DatasetStatus::Error),
            _ => Err(CoreError::internal(format!("Invalid dataset status: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetSource {
    Upload,
    Tiingo,
    Manual,
}

impl DatasetSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetSource::Upload => "upload",
            DatasetSource::Tiingo => "tiingo",
            DatasetSource::Manual => "manual",
        }
    }

    pub fn parse(s: &str) -> CoreResult<Self> {
        match s {
            "upload" => Ok(DatasetSource::Upload),
            "tiingo" => Ok(DatasetSource::Tiingo),
            "manual" => Ok(DatasetSource::Manual),
            _ => Err(CoreError::internal(format!("Invalid dataset source: {}", s))),
        }
    }
}

/// Experiment status. The core only ever writes `Pending`; the training
/// workflow owns every later transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperimentStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl ExperimentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperimentStatus::Pending => "pending",
            ExperimentStatus::Running => "running",
            ExperimentStatus::Completed => "completed",
            ExperimentStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> CoreResult<Self> {
        match s {
            "pending" => Ok(ExperimentStatus::Pending),
            "running" => Ok(ExperimentStatus::Running),
            "completed" => Ok(ExperimentStatus::Completed),
            "failed" => Ok(ExperimentStatus::Failed),
            _ => Err(CoreError::internal(format!(
                "Invalid experiment status: {}",
                s
            ))),
        }
    }
}

/// Deployment status. The core only ever writes `Deploying`; the deployment
/// workflow owns every later transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentStatus {
    Deploying,
    Active,
    Inactive,
    Error,
}

impl DeploymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentStatus::Deploying => "deploying",
            DeploymentStatus::Active => "active",
            DeploymentStatus::Inactive => "inactive",
            DeploymentStatus::Error => "error",
        }
    }

    pub fn parse(s: &str) -> CoreResult<Self> {
        match s {
            "deploying" => Ok(DeploymentStatus::Deploying),
            "active" => Ok(DeploymentStatus::Active),
            "inactive" => Ok(DeploymentStatus::Inactive),
            "error" => Ok(DeploymentStatus::Error),
            _ => Err(CoreError::internal(format!(
                "Invalid deployment status: {}",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboxStatus {
    Pending,
    Dispatched,
}

impl OutboxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutboxStatus::Pending => "pending",
            OutboxStatus::Dispatched => "dispatched",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips() {
        for status in ["pending", "running", "completed", "failed"] {
            assert_eq!(
                ExperimentStatus::parse(status)
                    .expect("Should parse experiment status")
                    .as_str(),
                status
            );
        }
        for status in ["deploying", "active", "inactive", "error"] {
            assert_eq!(
                DeploymentStatus::parse(status)
                    .expect("Should parse deployment status")
                    .as_str(),
                status
            );
        }
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        assert!(DatasetStatus::parse("archived").is_err());
        assert!(DatasetSource::parse("ftp").is_err());
    }
}
