use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use serde::Serialize;
use tracing::info;

use crate::database::entities::{datasets, deployments, experiments, projects};
use crate::errors::{CoreError, CoreResult};
use crate::services::authorization::{AuthorizationService, Identity};
use crate::services::validation::ValidationService;

/// Per-project resource counts for the project detail view.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ProjectStats {
    pub dataset_count: u64,
    pub experiment_count: u64,
    pub deployment_count: u64,
}

/// Caller-wide resource counts for the dashboard.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct DashboardCounts {
    pub project_count: u64,
    pub dataset_count: u64,
    pub experiment_count: u64,
    pub deployment_count: u64,
}

/// Project CRUD and aggregate counts, always scoped to the caller.
pub struct ProjectService {
    db: DatabaseConnection,
    auth: AuthorizationService,
}

impl ProjectService {
    pub fn new(db: DatabaseConnection) -> Self {
        let auth = AuthorizationService::new(db.clone());
        Self { db, auth }
    }

    pub async fn create_project(
        &self,
        identity: &Identity,
        name: &str,
    ) -> CoreResult<projects::Model> {
        let name = ValidationService::validate_project_name(name)?;

        let project = projects::ActiveModel {
            name: Set(name),
            owner_id: Set(identity.owner_id.clone()),
            org_id: Set(identity.org_id.clone()),
            ..projects::ActiveModel::new()
        }
        .insert(&self.db)
        .await
        .map_err(CoreError::from)?;

        info!(project_id = project.id, "Created project");
        Ok(project)
    }

    pub async fn get_project(
        &self,
        identity: &Identity,
        project_id: i32,
    ) -> CoreResult<projects::Model> {
        self.auth.require_project(identity, project_id).await
    }

    /// All projects visible to the caller, most recently updated first.
    pub async fn list_projects(&self, identity: &Identity) -> CoreResult<Vec<projects::Model>> {
        projects::Entity::find()
            .filter(AuthorizationService::owner_predicate(identity))
            .order_by_desc(projects::Column::UpdatedAt)
            .all(&self.db)
            .await
            .map_err(CoreError::from)
    }

    /// Deletes a project and, through the schema's cascades, every dataset,
    /// experiment, deployment, and fetch record under it.
    pub async fn delete_project(&self, identity: &Identity, project_id: i32) -> CoreResult<()> {
        let project = self.auth.require_project(identity, project_id).await?;

        projects::Entity::delete_by_id(project.id)
            .exec(&self.db)
            .await
            .map_err(CoreError::from)?;

        info!(project_id, "Deleted project");
        Ok(())
    }

    pub async fn project_stats(
        &self,
        identity: &Identity,
        project_id: i32,
    ) -> CoreResult<ProjectStats> {
        let project = self.auth.require_project(identity, project_id).await?;

        let dataset_count = datasets::Entity::find()
            .filter(datasets::Column::ProjectId.eq(project.id))
            .count(&self.db)
            .await
            .map_err(CoreError::from)?;

        let experiment_count = experiments::Entity::find()
            .filter(experiments::Column::ProjectId.eq(project.id))
            .count(&self.db)
            .await
            .map_err(CoreError::from)?;

        let deployment_count = deployments::Entity::find()
            .join(JoinType::InnerJoin, deployments::Relation::Experiments.def())
            .filter(experiments::Column::ProjectId.eq(project.id))
            .count(&self.db)
            .await
            .map_err(CoreError::from)?;

        Ok(ProjectStats {
            dataset_count,
            experiment_count,
            deployment_count,
        })
    }

    /// Counts across everything the caller can see. Each count applies the
    /// same ownership predicate the guards use, joined up to projects.
    pub async fn dashboard_counts(&self, identity: &Identity) -> CoreResult<DashboardCounts> {
        let predicate = AuthorizationService::owner_predicate(identity);

        let project_count = projects::Entity::find()
            .filter(predicate.clone())
            .count(&self.db)
            .await
            .map_err(CoreError::from)?;

        let dataset_count = datasets::Entity::find()
            .join(JoinType::InnerJoin, datasets::Relation::Projects.def())
            .filter(predicate.clone())
            .count(&self.db)
            .await
            .map_err(CoreError::from)?;

        let experiment_count = experiments::Entity::find()
            .join(JoinType::InnerJoin, experiments::Relation::Projects.def())
            .filter(predicate.clone())
            .count(&self.db)
            .await
            .map_err(CoreError::from)?;

        let deployment_count = deployments::Entity::find()
            .join(JoinType::InnerJoin, deployments::Relation::Experiments.def())
            .join(JoinType::InnerJoin, experiments::Relation::Projects.def())
            .filter(predicate)
            .count(&self.db)
            .await
            .map_err(CoreError::from)?;

        Ok(DashboardCounts {
            project_count,
            dataset_count,
            experiment_count,
            deployment_count,
        })
    }
}
