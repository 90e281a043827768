//! Orphaned-object reconciliation.
//!
//! An upload intent signs a URL before any row exists, so a client that
//! uploads and never finalizes leaves an object with no dataset. This sweep
//! lists the bucket, keeps every key a dataset row accounts for, and deletes
//! the rest once they are older than a grace period. The grace period covers
//! the window between a PUT and its finalize call.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sea_orm::{DatabaseConnection, EntityTrait};

use crate::database::entities::datasets;
use crate::errors::{CoreError, CoreResult};
use crate::storage::ObjectStore;

pub struct ReconciliationSweep {
    db: DatabaseConnection,
    store: Arc<dyn ObjectStore>,
    interval: Duration,
    grace: chrono::Duration,
}

impl ReconciliationSweep {
    pub fn new(
        db: DatabaseConnection,
        store: Arc<dyn ObjectStore>,
        interval: Duration,
        grace_secs: u64,
    ) -> Self {
        Self {
            db,
            store,
            interval,
            grace: chrono::Duration::seconds(grace_secs as i64),
        }
    }

    /// Spawns the periodic sweep task. A failed pass is logged and retried
    /// on the next tick.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            interval.tick().await;

            loop {
                interval.tick().await;
                match self.sweep_once().await {
                    Ok(0) => {}
                    Ok(count) => tracing::info!(count, "orphaned objects reclaimed"),
                    Err(e) => tracing::error!(error = %e, "reconciliation sweep failed"),
                }
            }
        })
    }

    /// Runs one pass and returns how many objects were deleted.
    pub async fn sweep_once(&self) -> CoreResult<usize> {
        let accounted: HashSet<String> = datasets::Entity::find()
            .all(&self.db)
            .await
            .map_err(CoreError::from)?
            .into_iter()
            .map(|d| d.object_key)
            .collect();

        let objects = self
            .store
            .list_objects("")
            .await
            .map_err(|e| CoreError::downstream("Could not list stored objects").with_source(e))?;

        let cutoff = Utc::now() - self.grace;
        let mut deleted = 0;
        for object in objects {
            if accounted.contains(&object.key) || object.last_modified > cutoff {
                continue;
            }
            self.store.delete_object(&object.key).await.map_err(|e| {
                CoreError::downstream("Could not delete orphaned object").with_source(e)
            })?;
            tracing::debug!(key = %object.key, "deleted orphaned object");
            deleted += 1;
        }

        Ok(deleted)
    }
}
