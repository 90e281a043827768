pub mod datasets;
pub mod deployments;
pub mod experiments;
pub mod health;
pub mod projects;
