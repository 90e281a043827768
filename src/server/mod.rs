pub mod app;
pub mod handlers;
pub mod identity;
pub mod response;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Subcommand;
use sea_orm_migration::prelude::*;
use tracing::info;

use crate::config::AppConfig;
use crate::database::{connection::*, migrations::Migrator};
use crate::storage::reconcile::ReconciliationSweep;
use crate::storage::s3::S3ObjectStore;
use crate::workflow::outbox::OutboxDispatcher;
use crate::workflow::temporal::TemporalClient;
use crate::AppContext;

#[derive(Subcommand, Debug)]
pub enum MigrateDirection {
    Up,
    Down,
    Fresh,
}

pub async fn start_server(port: u16, database_path: &str, cors_origin: Option<&str>) -> Result<()> {
    let config = AppConfig::from_env();
    let database_url = get_database_url(Some(database_path));
    let db = establish_connection(&database_url).await?;

    Migrator::up(&db, None).await?;
    info!("Database migrations completed");

    let storage = Arc::new(S3ObjectStore::new(config.storage.clone()));
    let workflow_client = Arc::new(TemporalClient::new(&config.workflow));

    OutboxDispatcher::new(
        db.clone(),
        workflow_client.clone(),
        Duration::from_secs(config.workflow.outbox_drain_interval_secs),
    )
    .spawn();
    info!("Outbox dispatcher running");

    ReconciliationSweep::new(
        db.clone(),
        storage.clone(),
        Duration::from_secs(config.storage.sweep_interval_secs),
        config.storage.sweep_grace_secs,
    )
    .spawn();
    info!("Storage reconciliation sweep running");

    let ctx = AppContext::new(db, storage, workflow_client, &config);
    let app = app::create_app(ctx, cors_origin).await?;

    log_routes();

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("Server running on http://0.0.0.0:{}", port);

    axum::serve(listener, app).await?;

    Ok(())
}

fn log_routes() {
    info!("API Endpoints:");
    info!("  /health                     - Health check");
    info!("  /api/v1/*                   - REST API (projects, datasets, experiments, deployments)");
}

pub async fn migrate_database(database_path: &str, direction: MigrateDirection) -> Result<()> {
    let database_url = get_database_url(Some(database_path));
    let db = establish_connection(&database_url).await?;

    match direction {
        MigrateDirection::Up => {
            info!("Running migrations up");
            Migrator::up(&db, None).await?;
        }
        MigrateDirection::Down => {
            info!("Running migrations down");
            Migrator::down(&db, None).await?;
        }
        MigrateDirection::Fresh => {
            info!("Running fresh migrations (down then up)");
            Migrator::down(&db, None).await?;
            Migrator::up(&db, None).await?;
        }
    }

    info!("Database migration completed");
    Ok(())
}
