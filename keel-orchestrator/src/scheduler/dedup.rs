//! Job dedup guard
//!
//! Keeps at most one outstanding poll job per target. Queued and running
//! jobs block a new poll; complete and errored ones do not, and an errored
//! job never causes an early retry.

use chrono::{DateTime, Utc};
use keel_core::domain::job::{Job, JobTrigger};
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Copy)]
pub struct DedupGuard {
    stale_after: Option<Duration>,
}

impl DedupGuard {
    /// Guard where an outstanding job older than `stale_after` stops blocking
    ///
    /// With `None`, outstanding jobs block until they finish.
    pub fn new(stale_after: Option<Duration>) -> Self {
        Self { stale_after }
    }

    /// First job that still occupies the target, if any
    pub fn outstanding<'a>(&self, jobs: &'a [Job], now: DateTime<Utc>) -> Option<&'a Job> {
        jobs.iter()
            .filter(|job| job.trigger == JobTrigger::Poll && !job.state.is_terminal())
            .find(|job| !self.is_stale(job, now))
    }

    fn is_stale(&self, job: &Job, now: DateTime<Utc>) -> bool {
        let Some(stale_after) = self.stale_after else {
            return false;
        };

        let since = job.started_at.unwrap_or(job.created_at);
        let age = now.signed_duration_since(since);
        let stale = age
            .to_std()
            .map(|age| age >= stale_after)
            .unwrap_or(false);

        if stale {
            warn!(
                job_id = %job.id,
                target = %job.target,
                state = ?job.state,
                "Outstanding poll job is stale, no longer blocking new polls"
            );
        }

        stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use keel_core::domain::job::{JobOperation, JobState};
    use keel_core::domain::poll::PollTarget;
    use uuid::Uuid;

    fn job(state: JobState, trigger: JobTrigger, created_at: DateTime<Utc>) -> Job {
        Job {
            id: Uuid::new_v4(),
            target: PollTarget::project("web"),
            operation: JobOperation::Poll,
            trigger,
            state,
            created_at,
            started_at: None,
            completed_at: None,
            error_message: None,
        }
    }

    #[test]
    fn test_no_jobs_is_clear() {
        assert!(DedupGuard::new(None).outstanding(&[], Utc::now()).is_none());
    }

    #[test]
    fn test_finished_jobs_do_not_block() {
        let now = Utc::now();
        let jobs = vec![
            job(JobState::Error, JobTrigger::Poll, now),
            job(JobState::Complete, JobTrigger::Poll, now),
        ];

        assert!(DedupGuard::new(None).outstanding(&jobs, now).is_none());
    }

    #[test]
    fn test_queued_and_running_block() {
        let now = Utc::now();

        for state in [JobState::Queued, JobState::Running] {
            let jobs = vec![
                job(JobState::Error, JobTrigger::Poll, now),
                job(state, JobTrigger::Poll, now),
            ];
            let found = DedupGuard::new(None).outstanding(&jobs, now).unwrap();
            assert_eq!(found.state, state);
        }
    }

    #[test]
    fn test_manual_jobs_are_ignored() {
        let now = Utc::now();
        let jobs = vec![job(JobState::Running, JobTrigger::Manual, now)];

        assert!(DedupGuard::new(None).outstanding(&jobs, now).is_none());
    }

    #[test]
    fn test_stale_job_stops_blocking() {
        let now = Utc::now();
        let old = now - ChronoDuration::minutes(10);
        let jobs = vec![job(JobState::Queued, JobTrigger::Poll, old)];

        let guard = DedupGuard::new(Some(Duration::from_secs(60)));
        assert!(guard.outstanding(&jobs, now).is_none());

        // Without a timeout the same job blocks forever
        assert!(DedupGuard::new(None).outstanding(&jobs, now).is_some());
    }

    #[test]
    fn test_recent_job_blocks_with_timeout() {
        let now = Utc::now();
        let jobs = vec![job(JobState::Running, JobTrigger::Poll, now)];

        let guard = DedupGuard::new(Some(Duration::from_secs(60)));
        assert!(guard.outstanding(&jobs, now).is_some());
    }

    #[test]
    fn test_running_age_counts_from_start() {
        let now = Utc::now();
        let mut running = job(
            JobState::Running,
            JobTrigger::Poll,
            now - ChronoDuration::hours(1),
        );
        running.started_at = Some(now - ChronoDuration::seconds(5));

        let guard = DedupGuard::new(Some(Duration::from_secs(60)));
        assert!(guard.outstanding(&[running], now).is_some());
    }
}
