//! Job enqueuer
//!
//! The scheduler hands job specs to a [`JobQueue`]. The default queue writes
//! them to the jobs table, where the job engine picks them up.

use async_trait::async_trait;
use keel_core::domain::job::{Job, JobSpec};
use sqlx::SqlitePool;

use super::error::{Result, SchedulerError};
use crate::repository::job_repository;

#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Submit a job, returning it as queued
    async fn enqueue(&self, spec: JobSpec) -> Result<Job>;
}

/// Queue backed by the jobs table
#[derive(Clone)]
pub struct SqliteJobQueue {
    pool: SqlitePool,
}

impl SqliteJobQueue {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobQueue for SqliteJobQueue {
    async fn enqueue(&self, spec: JobSpec) -> Result<Job> {
        job_repository::create(&self.pool, spec)
            .await
            .map_err(|e| SchedulerError::Enqueue(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_pool;
    use keel_core::domain::job::JobState;
    use keel_core::domain::poll::PollTarget;

    #[tokio::test]
    async fn test_enqueue_persists_queued_job() {
        let pool = test_pool().await;
        let queue = SqliteJobQueue::new(pool.clone());
        let target = PollTarget::project("web");

        let job = queue.enqueue(JobSpec::poll(target.clone())).await.unwrap();
        assert_eq!(job.state, JobState::Queued);

        let jobs = job_repository::list_poll_jobs(&pool, &target).await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].id, job.id);
    }
}
