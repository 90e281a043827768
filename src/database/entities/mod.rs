pub mod common_types;

pub mod datasets;
pub mod deployments;
pub mod experiments;
pub mod projects;
pub mod tiingo_fetches;
pub mod workflow_outbox;
