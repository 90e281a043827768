use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};

pub use super::common_types::{DatasetSource, DatasetStatus};

/// Dataset entity. `object_key` points into the object store and is globally
/// unique; the file bytes never pass through this service.
///
/// `status` is written by the upload coordinator (finalize marks `ready`) or
/// by the external ingestion workflow, never by a direct user edit.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "datasets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub project_id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub object_key: String,
    pub status: String,
    pub source: String,
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
    #[sea_orm(has_many = "super::experiments::Entity")]
    Experiments,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
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
            project_id: ActiveValue::NotSet,
            name: ActiveValue::NotSet,
            object_key: ActiveValue::NotSet,
            status: Set(DatasetStatus::Ready.as_str().to_string()),
            source: Set(DatasetSource::Upload.as_str().to_string()),
            created_at: Set(chrono::Utc::now()),
        }
    }
}
