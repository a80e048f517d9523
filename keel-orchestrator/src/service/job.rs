//! Job Service
//!
//! Business logic for job reads and the state transitions reported by the
//! job engine. The poll scheduler creates jobs; it never moves them between
//! states.

use keel_core::domain::job::{Job, JobState};
use keel_core::dto::job::CompleteJob;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::repository::job_repository;

/// Service error type
#[derive(Debug)]
pub enum JobError {
    NotFound(Uuid),
    InvalidState(String),
    DatabaseError(sqlx::Error),
}

impl From<sqlx::Error> for JobError {
    fn from(err: sqlx::Error) -> Self {
        JobError::DatabaseError(err)
    }
}

/// Get a job by ID
pub async fn get_job(pool: &SqlitePool, id: Uuid) -> Result<Job, JobError> {
    let job = job_repository::find_by_id(pool, id)
        .await?
        .ok_or(JobError::NotFound(id))?;

    Ok(job)
}

/// List all jobs
pub async fn list_all_jobs(pool: &SqlitePool) -> Result<Vec<Job>, JobError> {
    let jobs = job_repository::list_all(pool).await?;
    Ok(jobs)
}

/// Mark a queued job as running
pub async fn start_job(pool: &SqlitePool, job_id: Uuid) -> Result<Job, JobError> {
    let job = get_job(pool, job_id).await?;

    // Check if job is in the right state
    if job.state != JobState::Queued {
        return Err(JobError::InvalidState(format!(
            "Job {} is not in Queued state (current: {:?})",
            job_id, job.state
        )));
    }

    // Another caller may have moved the job since it was read
    if !job_repository::update_state_to_running(pool, job_id).await? {
        return Err(JobError::InvalidState(format!(
            "Job {} is no longer in Queued state",
            job_id
        )));
    }

    tracing::info!("Job {} started", job_id);

    get_job(pool, job_id).await
}

/// Complete a job, successfully or with an error
pub async fn complete_job(pool: &SqlitePool, job_id: Uuid, req: CompleteJob) -> Result<Job, JobError> {
    let job = get_job(pool, job_id).await?;

    if job.state.is_terminal() {
        return Err(JobError::InvalidState(format!(
            "Job {} is already finished (current: {:?})",
            job_id, job.state
        )));
    }

    if job.state != JobState::Running {
        tracing::warn!(
            "Completing job {} that is not in Running state (current: {:?})",
            job_id,
            job.state
        );
    }

    let state = completion_state(&req);
    let updated =
        job_repository::update_state_to_completed(pool, job_id, state, req.error_message.as_deref())
            .await?;
    if !updated {
        return Err(JobError::InvalidState(format!(
            "Job {} is already finished",
            job_id
        )));
    }

    tracing::info!("Job {} completed with state: {:?}", job_id, state);

    get_job(pool, job_id).await
}

fn completion_state(req: &CompleteJob) -> JobState {
    if req.success {
        JobState::Complete
    } else {
        JobState::Error
    }
}
