use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};

pub use super::common_types::OutboxStatus;

/// Transactional outbox row for workflow dispatch.
///
/// Inserted in the same transaction as the experiment or deployment it
/// belongs to, so a committed entity always has a recorded dispatch intent.
/// The outbox dispatcher drains pending rows and marks them `dispatched`
/// only once the workflow engine acknowledges the start; `workflow_id`
/// uniqueness makes redelivery idempotent at the engine.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "workflow_outbox")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub workflow_id: String,
    pub workflow_type: String,
    pub task_queue: String,
    #[sea_orm(column_type = "Text")]
    pub payload: String,
    pub status: String,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub created_at: ChronoDateTimeUtc,
    pub dispatched_at: Option<ChronoDateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub fn new() -> Self {
        Self {
            id: ActiveValue::NotSet,
            workflow_id: ActiveValue::NotSet,
            workflow_type: ActiveValue::NotSet,
            task_queue: ActiveValue::NotSet,
            payload: ActiveValue::NotSet,
            status: Set(OutboxStatus::Pending.as_str().to_string()),
            attempts: Set(0),
            last_error: ActiveValue::NotSet,
            created_at: Set(chrono::Utc::now()),
            dispatched_at: ActiveValue::NotSet,
        }
    }
}
