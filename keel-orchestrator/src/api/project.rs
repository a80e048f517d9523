//! Project API Handlers
//!
//! HTTP endpoints for project management.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use keel_core::domain::poll::TargetKind;
use keel_core::domain::project::Project;
use keel_core::dto::project::{ProjectSummary, UpsertProject};

use crate::api::AppState;
use crate::api::error::ApiResult;
use crate::service::project_service;

/// POST /project
/// Create or update a project and its applications
pub async fn upsert_project(
    State(state): State<AppState>,
    Json(req): Json<UpsertProject>,
) -> ApiResult<Json<Project>> {
    tracing::info!("Upserting project: {}", req.name);

    let project = project_service::upsert_project(&state.pool, req).await?;

    // Both kinds may have gained a newly enabled target
    state.poller.wake(TargetKind::Project);
    state.poller.wake(TargetKind::Application);

    Ok(Json(project))
}

/// GET /project/list
pub async fn list_projects(State(state): State<AppState>) -> ApiResult<Json<Vec<ProjectSummary>>> {
    tracing::debug!("Listing all projects");

    let projects = project_service::list_projects(&state.pool).await?;

    Ok(Json(projects.into_iter().map(ProjectSummary::from).collect()))
}

/// GET /project/{name}
pub async fn get_project(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Project>> {
    tracing::debug!("Getting project: {}", name);

    let project = project_service::get_project(&state.pool, &name).await?;

    Ok(Json(project))
}

/// DELETE /project/{name}
/// Delete a project with its applications and schedules
pub async fn delete_project(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<StatusCode> {
    tracing::info!("Deleting project: {}", name);

    project_service::delete_project(&state.pool, &name).await?;

    Ok(StatusCode::NO_CONTENT)
}
