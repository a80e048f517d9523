//! Application API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use keel_core::domain::application::Application;
use keel_core::domain::poll::TargetKind;
use keel_core::dto::application::UpsertApplication;

use crate::api::AppState;
use crate::api::error::ApiResult;
use crate::service::application_service;

/// POST /project/{project}/application
/// Create or update an application, including its poll toggle
pub async fn upsert_application(
    State(state): State<AppState>,
    Path(project): Path<String>,
    Json(req): Json<UpsertApplication>,
) -> ApiResult<Json<Application>> {
    tracing::info!("Upserting application: {}/{}", project, req.name);

    let application = application_service::upsert_application(&state.pool, &project, req).await?;
    state.poller.wake(TargetKind::Application);

    Ok(Json(application))
}

/// GET /project/{project}/application/list
pub async fn list_applications(
    State(state): State<AppState>,
    Path(project): Path<String>,
) -> ApiResult<Json<Vec<Application>>> {
    tracing::debug!("Listing applications of project: {}", project);

    let applications = application_service::list_applications(&state.pool, &project).await?;

    Ok(Json(applications))
}

/// GET /project/{project}/application/{name}
pub async fn get_application(
    State(state): State<AppState>,
    Path((project, name)): Path<(String, String)>,
) -> ApiResult<Json<Application>> {
    tracing::debug!("Getting application: {}/{}", project, name);

    let application = application_service::get_application(&state.pool, &project, &name).await?;

    Ok(Json(application))
}
