use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::database::entities::datasets;
use crate::errors::{CoreError, CoreResult};
use crate::services::authorization::{AuthorizationService, Identity};
use crate::services::validation::ValidationService;
use crate::storage::ObjectStore;

/// Result of the first phase of an upload: the client PUTs the file bytes
/// to `upload_url` and then finalizes with `object_key`.
#[derive(Clone, Debug, Serialize)]
pub struct UploadIntent {
    pub upload_url: String,
    pub object_key: String,
}

/// Two-phase dataset ingestion: broker an upload URL, then register the
/// uploaded object as a dataset row. File bytes never pass through here.
pub struct DatasetService {
    db: DatabaseConnection,
    auth: AuthorizationService,
    storage: Arc<dyn ObjectStore>,
    upload_url_ttl_secs: u64,
}

impl DatasetService {
    pub fn new(
        db: DatabaseConnection,
        storage: Arc<dyn ObjectStore>,
        upload_url_ttl_secs: u64,
    ) -> Self {
        let auth = AuthorizationService::new(db.clone());
        Self {
            db,
            auth,
            storage,
            upload_url_ttl_secs,
        }
    }

    /// Phase one. Checks ownership, derives a collision-free object key
    /// under the caller's prefix, and asks the store to sign a PUT for it.
    /// Writes nothing: an abandoned upload leaves no trace in the database.
    pub async fn create_upload_intent(
        &self,
        identity: &Identity,
        project_id: i32,
        file_name: &str,
        content_type: &str,
    ) -> CoreResult<UploadIntent> {
        let project = self.auth.require_project(identity, project_id).await?;
        let file_name = ValidationService::validate_file_name(file_name)?;

        let object_key = format!(
            "{}/{}/{}-{}",
            identity.owner_id,
            project.id,
            Uuid::new_v4().simple(),
            file_name
        );

        let upload_url = self
            .storage
            .presigned_put_url(&object_key, content_type, self.upload_url_ttl_secs)
            .await
            .map_err(|e| {
                CoreError::downstream("Could not produce an upload URL").with_source(e)
            })?;

        Ok(UploadIntent {
            upload_url,
            object_key,
        })
    }

    /// Phase two. The caller reports the upload complete; ownership is
    /// re-checked because the guard from phase one does not carry over.
    pub async fn finalize_dataset(
        &self,
        identity: &Identity,
        project_id: i32,
        name: &str,
        object_key: &str,
    ) -> CoreResult<datasets::Model> {
        let project = self.auth.require_project(identity, project_id).await?;
        let name = ValidationService::validate_file_name(name)?;

        if object_key.trim().is_empty() {
            return Err(CoreError::validation("Object key cannot be empty"));
        }

        // A duplicate object_key surfaces as Conflict via the unique index
        let dataset = datasets::ActiveModel {
            project_id: Set(project.id),
            name: Set(name),
            object_key: Set(object_key.to_string()),
            ..datasets::ActiveModel::new()
        }
        .insert(&self.db)
        .await
        .map_err(CoreError::from)?;

        info!(dataset_id = dataset.id, project_id, "Registered dataset");
        Ok(dataset)
    }

    pub async fn list_datasets(
        &self,
        identity: &Identity,
        project_id: i32,
    ) -> CoreResult<Vec<datasets::Model>> {
        let project = self.auth.require_project(identity, project_id).await?;

        datasets::Entity::find()
            .filter(datasets::Column::ProjectId.eq(project.id))
            .order_by_desc(datasets::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(CoreError::from)
    }

    pub async fn get_dataset(
        &self,
        identity: &Identity,
        dataset_id: i32,
    ) -> CoreResult<datasets::Model> {
        self.auth.require_dataset(identity, dataset_id).await
    }

    /// Removes the dataset row. Experiments that referenced it keep running;
    /// their `dataset_id` is nulled by the schema. The stored object is left
    /// for the retention job, which is outside this core.
    pub async fn delete_dataset(&self, identity: &Identity, dataset_id: i32) -> CoreResult<()> {
        let dataset = self.auth.require_dataset(identity, dataset_id).await?;

        datasets::Entity::delete_by_id(dataset.id)
            .exec(&self.db)
            .await
            .map_err(CoreError::from)?;

        info!(dataset_id, "Deleted dataset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::entities::{experiments, projects};
    use crate::database::test_utils::setup_test_db;
    use crate::errors::CoreErrorKind;
    use crate::storage::MockObjectStore;

    async fn seed_project(db: &DatabaseConnection, owner: &str) -> projects::Model {
        projects::ActiveModel {
            name: Set("Alpha".to_string()),
            owner_id: Set(owner.to_string()),
            ..projects::ActiveModel::new()
        }
        .insert(db)
        .await
        .expect("insert project")
    }

    fn service(db: DatabaseConnection, storage: Arc<dyn ObjectStore>) -> DatasetService {
        DatasetService::new(db, storage, 600)
    }

    #[tokio::test]
    async fn test_upload_intent_writes_no_rows() {
        let db = setup_test_db().await;
        let project = seed_project(&db, "u1").await;
        let svc = service(db.clone(), Arc::new(MockObjectStore::new()));

        let intent = svc
            .create_upload_intent(&Identity::user("u1"), project.id, "prices.csv", "text/csv")
            .await
            .expect("intent");

        assert!(intent
            .object_key
            .starts_with(&format!("u1/{}/", project.id)));
        assert!(intent.object_key.ends_with("-prices.csv"));

        let rows = datasets::Entity::find().all(&db).await.expect("query");
        assert!(rows.is_empty(), "intent phase must not create dataset rows");
    }

    #[tokio::test]
    async fn test_upload_intent_keys_are_collision_free() {
        let db = setup_test_db().await;
        let project = seed_project(&db, "u1").await;
        let svc = service(db, Arc::new(MockObjectStore::new()));
        let identity = Identity::user("u1");

        let a = svc
            .create_upload_intent(&identity, project.id, "prices.csv", "text/csv")
            .await
            .expect("intent");
        let b = svc
            .create_upload_intent(&identity, project.id, "prices.csv", "text/csv")
            .await
            .expect("intent");
        assert_ne!(a.object_key, b.object_key);
    }

    #[tokio::test]
    async fn test_storage_failure_maps_to_downstream() {
        let db = setup_test_db().await;
        let project = seed_project(&db, "u1").await;
        let svc = service(db, Arc::new(MockObjectStore::failing()));

        let err = svc
            .create_upload_intent(&Identity::user("u1"), project.id, "prices.csv", "text/csv")
            .await
            .expect_err("failing store");
        assert_eq!(err.kind(), CoreErrorKind::Downstream);
    }

    #[tokio::test]
    async fn test_finalize_registers_ready_dataset() {
        let db = setup_test_db().await;
        let project = seed_project(&db, "u1").await;
        let svc = service(db, Arc::new(MockObjectStore::new()));

        let dataset = svc
            .finalize_dataset(
                &Identity::user("u1"),
                project.id,
                "prices.csv",
                "u1/1/abc-prices.csv",
            )
            .await
            .expect("finalize");

        assert_eq!(dataset.status, "ready");
        assert_eq!(dataset.source, "upload");
    }

    #[tokio::test]
    async fn test_duplicate_object_key_is_conflict() {
        let db = setup_test_db().await;
        let project = seed_project(&db, "u1").await;
        let svc = service(db, Arc::new(MockObjectStore::new()));
        let identity = Identity::user("u1");

        svc.finalize_dataset(&identity, project.id, "a.csv", "u1/1/same-key")
            .await
            .expect("first finalize");
        let err = svc
            .finalize_dataset(&identity, project.id, "b.csv", "u1/1/same-key")
            .await
            .expect_err("duplicate key");
        assert_eq!(err.kind(), CoreErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_non_owner_cannot_broker_uploads() {
        let db = setup_test_db().await;
        let project = seed_project(&db, "u1").await;
        let svc = service(db, Arc::new(MockObjectStore::new()));

        let err = svc
            .create_upload_intent(&Identity::user("u2"), project.id, "prices.csv", "text/csv")
            .await
            .expect_err("non-owner");
        assert_eq!(err.kind(), CoreErrorKind::NotFoundOrForbidden);
    }

    #[tokio::test]
    async fn test_delete_dataset_detaches_experiments() {
        let db = setup_test_db().await;
        let project = seed_project(&db, "u1").await;
        let svc = service(db.clone(), Arc::new(MockObjectStore::new()));
        let identity = Identity::user("u1");

        let dataset = svc
            .finalize_dataset(&identity, project.id, "prices.csv", "u1/1/k")
            .await
            .expect("finalize");

        let experiment = experiments::ActiveModel {
            project_id: Set(project.id),
            dataset_id: Set(Some(dataset.id)),
            workflow_id: Set("train-x".to_string()),
            model_config: Set("{}".to_string()),
            ..experiments::ActiveModel::new()
        }
        .insert(&db)
        .await
        .expect("insert experiment");

        svc.delete_dataset(&identity, dataset.id)
            .await
            .expect("delete");

        let survivor = experiments::Entity::find_by_id(experiment.id)
            .one(&db)
            .await
            .expect("query")
            .expect("experiment survives dataset deletion");
        assert_eq!(survivor.dataset_id, None);
    }
}
