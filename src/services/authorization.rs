use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, JoinType, QueryFilter, QuerySelect,
    RelationTrait,
};

use crate::database::entities::{datasets, deployments, experiments, projects};
use crate::errors::{CoreError, CoreResult};

/// Caller identity resolved by the external identity provider. Operations in
/// this core never run without one.
#[derive(Clone, Debug, PartialEq)]
pub struct Identity {
    pub owner_id: String,
    pub org_id: Option<String>,
}

impl Identity {
    pub fn user(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            org_id: None,
        }
    }
}

/// Ownership guard, the first step of every public operation.
///
/// Each check runs a single query that joins the target resource to its
/// owning project and applies the owner predicate in SQL. A resource that
/// does not exist and a resource owned by someone else produce the same
/// `NotFoundOrForbidden` outcome, so existence never leaks to non-owners.
#[derive(Clone)]
pub struct AuthorizationService {
    db: DatabaseConnection,
}

impl AuthorizationService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// The ownership predicate on the projects table: owned directly by the
    /// caller, or by the caller's organization when both sides have one.
    pub fn owner_predicate(identity: &Identity) -> Condition {
        let mut condition =
            Condition::any().add(projects::Column::OwnerId.eq(identity.owner_id.clone()));
        if let Some(org_id) = &identity.org_id {
            condition = condition.add(projects::Column::OrgId.eq(org_id.clone()));
        }
        condition
    }

    pub async fn require_project(
        &self,
        identity: &Identity,
        project_id: i32,
    ) -> CoreResult<projects::Model> {
        projects::Entity::find_by_id(project_id)
            .filter(Self::owner_predicate(identity))
            .one(&self.db)
            .await
            .map_err(CoreError::from)?
            .ok_or_else(CoreError::not_found_or_forbidden)
    }

    pub async fn require_dataset(
        &self,
        identity: &Identity,
        dataset_id: i32,
    ) -> CoreResult<datasets::Model> {
        datasets::Entity::find_by_id(dataset_id)
            .join(JoinType::InnerJoin, datasets::Relation::Projects.def())
            .filter(Self::owner_predicate(identity))
            .one(&self.db)
            .await
            .map_err(CoreError::from)?
            .ok_or_else(CoreError::not_found_or_forbidden)
    }

    pub async fn require_experiment(
        &self,
        identity: &Identity,
        experiment_id: i32,
    ) -> CoreResult<experiments::Model> {
        experiments::Entity::find_by_id(experiment_id)
            .join(JoinType::InnerJoin, experiments::Relation::Projects.def())
            .filter(Self::owner_predicate(identity))
            .one(&self.db)
            .await
            .map_err(CoreError::from)?
            .ok_or_else(CoreError::not_found_or_forbidden)
    }

    pub async fn require_deployment(
        &self,
        identity: &Identity,
        deployment_id: i32,
    ) -> CoreResult<deployments::Model> {
        deployments::Entity::find_by_id(deployment_id)
            .join(JoinType::InnerJoin, deployments::Relation::Experiments.def())
            .join(JoinType::InnerJoin, experiments::Relation::Projects.def())
            .filter(Self::owner_predicate(identity))
            .one(&self.db)
            .await
            .map_err(CoreError::from)?
            .ok_or_else(CoreError::not_found_or_forbidden)
    }
}
