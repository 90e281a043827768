pub mod authorization;
pub mod dataset_service;
pub mod deployment_service;
pub mod model_config;
pub mod project_service;
pub mod training_service;
pub mod validation;

pub use authorization::*;
pub use dataset_service::*;
pub use deployment_service::*;
pub use model_config::*;
pub use project_service::*;
pub use training_service::*;
pub use validation::*;
