use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Side record of an external market-data fetch. Written by the fetch
/// workflow, never by this core; immutable once created. Dates are kept as
/// ISO `YYYY-MM-DD` strings matching the fetch API's parameters.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tiingo_fetches")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub project_id: i32,
    pub owner_id: String,
    pub data_type: String,
    pub symbol: String,
    pub start_date: String,
    pub end_date: String,
    pub frequency: String,
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
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
