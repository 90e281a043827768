use anyhow::Result;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

use super::handlers::{datasets, deployments, experiments, health, projects};
use crate::AppContext;

#[derive(Clone)]
pub struct AppState {
    pub ctx: AppContext,
}

pub async fn create_app(ctx: AppContext, cors_origin: Option<&str>) -> Result<Router> {
    let state = AppState { ctx };

    let cors = match cors_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin.parse::<axum::http::HeaderValue>()?)
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1", api_v1_routes())
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(state);

    Ok(app)
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(projects::dashboard_counts))
        // Project routes
        .route("/projects", get(projects::list_projects))
        .route("/projects", post(projects::create_project))
        .route("/projects/:id", get(projects::get_project))
        .route("/projects/:id", delete(projects::delete_project))
        .route("/projects/:id/stats", get(projects::project_stats))
        // Dataset routes
        .route("/projects/:id/datasets", get(datasets::list_datasets))
        .route("/projects/:id/datasets", post(datasets::finalize_dataset))
        .route(
            "/projects/:id/datasets/upload-intent",
            post(datasets::create_upload_intent),
        )
        .route("/datasets/:id", get(datasets::get_dataset))
        .route("/datasets/:id", delete(datasets::delete_dataset))
        // Experiment routes
        .route("/projects/:id/experiments", get(experiments::list_experiments))
        .route("/projects/:id/experiments", post(experiments::start_training))
        .route("/experiments/:id", get(experiments::get_experiment))
        // Market-data fetch routes
        .route("/projects/:id/fetches", get(experiments::list_fetches))
        .route("/projects/:id/fetches", post(experiments::start_fetch))
        // Deployment routes
        .route(
            "/experiments/:id/deployments",
            get(deployments::list_deployments),
        )
        .route(
            "/experiments/:id/deployments",
            post(deployments::start_deployment),
        )
        .route("/deployments/:id", get(deployments::get_deployment))
}
