//! API Module
//!
//! HTTP API layer for the orchestrator.
//! Each submodule handles endpoints for a specific domain.

pub mod application;
pub mod error;
pub mod health;
pub mod job;
pub mod poll;
pub mod project;

use axum::{
    Router,
    routing::{delete, get, post},
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::scheduler::PollManager;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub poller: Arc<PollManager>,
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Project endpoints
        .route("/project", post(project::upsert_project))
        .route("/project/list", get(project::list_projects))
        .route("/project/{name}", get(project::get_project))
        .route("/project/{name}", delete(project::delete_project))
        // Application endpoints
        .route(
            "/project/{project}/application",
            post(application::upsert_application),
        )
        .route(
            "/project/{project}/application/list",
            get(application::list_applications),
        )
        .route(
            "/project/{project}/application/{name}",
            get(application::get_application),
        )
        // Poll schedule introspection
        .route("/poll/{kind}/peek", get(poll::peek))
        // Job endpoints
        .route("/job/list", get(job::list_all_jobs))
        .route("/job/{id}", get(job::get_job))
        .route("/job/{id}/start", post(job::start_job))
        .route("/job/{id}/complete", post(job::complete_job))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
