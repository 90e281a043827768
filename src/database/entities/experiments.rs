use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};

pub use super::common_types::ExperimentStatus;

/// Experiment entity. Created `pending` with a globally unique, immutable
/// `workflow_id`; the training workflow bound to that id owns all later
/// status transitions and writes `performance_metrics` and
/// `model_artifact_key` on completion.
///
/// `dataset_id` is nulled (not cascaded) when the dataset is deleted so that
/// experiment history survives its input data.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "experiments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub project_id: i32,
    pub dataset_id: Option<i32>,
    #[sea_orm(unique)]
    pub workflow_id: String,
    pub status: String,
    #[sea_orm(column_type = "Text")]
    pub model_config: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub performance_metrics: Option<String>,
    pub model_artifact_key: Option<String>,
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::projects::Entity",
        from = "Column::ProjectId",
        to = "super::projects::Column::Id"
    )]
    Projects,
    #[sea_orm(
        belongs_to = "super::datasets::Entity",
        from = "Column::DatasetId",
        to = "super::datasets::Column::Id"
    )]
    Datasets,
    #[sea_orm(has_many = "super::deployments::Entity")]
    Deployments,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl Related<super::datasets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Datasets.def()
    }
}

impl Related<super::deployments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Deployments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub fn new() -> Self {
        Self {
            id: ActiveValue::NotSet,
            project_id: ActiveValue::NotSet,
            dataset_id: ActiveValue::NotSet,
            workflow_id: ActiveValue::NotSet,
            status: Set(ExperimentStatus::Pending.as_str().to_string()),
            model_config: ActiveValue::NotSet,
            performance_metrics: ActiveValue::NotSet,
            model_artifact_key: ActiveValue::NotSet,
            created_at: Set(chrono::Utc::now()),
        }
    }
}
