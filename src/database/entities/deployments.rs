use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};

pub use super::common_types::DeploymentStatus;

/// Deployment entity. Created `deploying` only when the referenced
/// experiment is `completed`; the deployment workflow writes `endpoint_url`
/// and every later status transition.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "deployments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub experiment_id: i32,
    pub endpoint_url: Option<String>,
    pub status: String,
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::experiments::Entity",
        from = "Column::ExperimentId",
        to = "super::experiments::Column::Id"
    )]
    Experiments,
}

impl Related<super::experiments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Experiments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub fn new() -> Self {
        Self {
            id: ActiveValue::NotSet,
            experiment_id: ActiveValue::NotSet,
            endpoint_url: ActiveValue::NotSet,
            status: Set(DeploymentStatus::Deploying.as_str().to_string()),
            created_at: Set(chrono::Utc::now()),
        }
    }
}
