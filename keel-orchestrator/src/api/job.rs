//! Job API Handlers
//!
//! HTTP endpoints for job reads and the transitions reported by the job
//! engine.

use axum::{
    Json,
    extract::{Path, State},
};
use keel_core::domain::job::Job;
use keel_core::dto::job::CompleteJob;
use uuid::Uuid;

use crate::api::AppState;
use crate::api::error::ApiResult;
use crate::service::job_service;

/// GET /job/list
pub async fn list_all_jobs(State(state): State<AppState>) -> ApiResult<Json<Vec<Job>>> {
    tracing::debug!("Listing all jobs");

    let jobs = job_service::list_all_jobs(&state.pool).await?;

    Ok(Json(jobs))
}

/// GET /job/{id}
pub async fn get_job(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<Job>> {
    tracing::debug!("Getting job: {}", id);

    let job = job_service::get_job(&state.pool, id).await?;

    Ok(Json(job))
}

/// POST /job/{id}/start
/// Mark a queued job as running
pub async fn start_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Job>> {
    tracing::info!("Starting job: {}", id);

    let job = job_service::start_job(&state.pool, id).await?;

    Ok(Json(job))
}

/// POST /job/{id}/complete
/// Record the final state of a job
pub async fn complete_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CompleteJob>,
) -> ApiResult<Json<Job>> {
    tracing::info!("Completing job {} (success: {})", id, req.success);

    let job = job_service::complete_job(&state.pool, id, req).await?;

    Ok(Json(job))
}
