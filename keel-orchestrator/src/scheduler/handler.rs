//! Per-kind poll handlers
//!
//! A [`PollHandler`] gives the generic poll loop everything it needs to know
//! about one kind of target: how to find the next due target, what job to
//! enqueue for it and how to move its schedule forward.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use keel_core::domain::job::{Job, JobSpec};
use keel_core::domain::poll::{PollSchedule, PollTarget, TargetKind};
use sqlx::SqlitePool;

use super::error::Result;
use crate::repository::{job_repository, schedule_repository};

#[async_trait]
pub trait PollHandler: Send + Sync + 'static {
    /// Target kind this handler schedules
    fn kind(&self) -> TargetKind;

    /// Pool holding the schedules and jobs
    fn pool(&self) -> &SqlitePool;

    /// Job to enqueue when `target` comes due
    fn build_job_spec(&self, target: &PollTarget) -> JobSpec {
        JobSpec::poll(target.clone())
    }

    /// Soonest due enabled target of this kind
    async fn peek(&self) -> Result<Option<(PollTarget, DateTime<Utc>)>> {
        Ok(schedule_repository::peek_soonest(self.pool(), self.kind()).await?)
    }

    /// Current schedule of a target
    async fn schedule(&self, target: &PollTarget) -> Result<Option<PollSchedule>> {
        Ok(schedule_repository::find(self.pool(), target).await?)
    }

    /// Move the target's next poll to `now + interval`
    async fn advance(&self, target: &PollTarget, now: DateTime<Utc>) -> Result<bool> {
        Ok(schedule_repository::advance(self.pool(), target, now).await?)
    }

    /// Poll-triggered jobs of the target
    async fn list_jobs(&self, target: &PollTarget) -> Result<Vec<Job>> {
        Ok(job_repository::list_poll_jobs(self.pool(), target).await?)
    }
}

/// Polls project data sources
#[derive(Clone)]
pub struct ProjectPollHandler {
    pool: SqlitePool,
}

impl ProjectPollHandler {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PollHandler for ProjectPollHandler {
    fn kind(&self) -> TargetKind {
        TargetKind::Project
    }

    fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Requests application status reports
#[derive(Clone)]
pub struct ApplicationPollHandler {
    pool: SqlitePool,
}

impl ApplicationPollHandler {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PollHandler for ApplicationPollHandler {
    fn kind(&self) -> TargetKind {
        TargetKind::Application
    }

    fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
