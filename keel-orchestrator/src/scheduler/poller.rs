//! Poll loop
//!
//! Sleeps until the soonest scheduled target of its kind is due, then runs
//! one cycle for that target: dedup check, enqueue, advance. The same loop
//! drives projects and applications through a [`PollHandler`].

use chrono::Utc;
use keel_core::domain::poll::PollTarget;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::dedup::DedupGuard;
use super::error::Result;
use super::handler::PollHandler;
use super::queue::JobQueue;
use crate::config::SchedulerConfig;

/// What a poll loop is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Nothing scheduled, sleeping the idle interval
    Idle,
    /// Sleeping until a target is due
    Waiting,
    /// Cancelled and exited
    Stopped,
}

/// Result of one poll cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A new poll job was queued
    Enqueued(Uuid),
    /// A poll job for the target was still outstanding
    Deduplicated,
    /// The queue rejected the job
    EnqueueFailed,
    /// The target was disabled or removed after it was peeked
    Skipped,
}

enum Wake {
    Due,
    Notified,
    Cancelled,
}

pub struct PollLoop<H: PollHandler> {
    handler: H,
    queue: Arc<dyn JobQueue>,
    guard: DedupGuard,
    idle_interval: Duration,
    cancel: CancellationToken,
    wake: Arc<Notify>,
    state: watch::Sender<LoopState>,
}

impl<H: PollHandler> PollLoop<H> {
    pub fn new(
        handler: H,
        queue: Arc<dyn JobQueue>,
        config: &SchedulerConfig,
        cancel: CancellationToken,
    ) -> Self {
        let (state, _) = watch::channel(LoopState::Idle);
        Self {
            handler,
            queue,
            guard: DedupGuard::new(config.stale_job_timeout),
            idle_interval: config.idle_interval,
            cancel,
            wake: Arc::new(Notify::new()),
            state,
        }
    }

    /// Signal that makes the loop re-peek early
    pub fn wake_handle(&self) -> Arc<Notify> {
        Arc::clone(&self.wake)
    }

    /// Receiver for the loop's state
    pub fn subscribe(&self) -> watch::Receiver<LoopState> {
        self.state.subscribe()
    }

    /// Runs until the cancellation token fires
    pub async fn run(self) {
        let kind = self.handler.kind();
        info!(%kind, "Starting poll loop");

        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            let next = match self.handler.peek().await {
                Ok(next) => next,
                Err(e) => {
                    warn!(%kind, error = %e, "Failed to peek poll schedule");
                    if !self.idle().await {
                        break;
                    }
                    continue;
                }
            };

            let Some((target, due_at)) = next else {
                self.set_state(LoopState::Idle);
                if !self.idle().await {
                    break;
                }
                continue;
            };

            self.set_state(LoopState::Waiting);
            let delay = (due_at - Utc::now()).to_std().unwrap_or(Duration::ZERO);

            match self.sleep(delay).await {
                Wake::Cancelled => break,
                Wake::Notified => continue,
                Wake::Due => {}
            }

            match self.run_cycle(&target).await {
                Ok(outcome) => debug!(%kind, %target, ?outcome, "Poll cycle finished"),
                Err(e) => {
                    warn!(%kind, %target, error = %e, "Poll cycle failed");
                    if !self.idle().await {
                        break;
                    }
                }
            }
        }

        self.set_state(LoopState::Stopped);
        info!(%kind, "Poll loop stopped");
    }

    /// One cycle for a due target
    ///
    /// The schedule advances whether or not a job was queued, so a failing
    /// or slow queue lowers the poll rate instead of growing the backlog.
    pub async fn run_cycle(&self, target: &PollTarget) -> Result<CycleOutcome> {
        let enabled = self
            .handler
            .schedule(target)
            .await?
            .is_some_and(|schedule| schedule.enabled);

        if !enabled {
            debug!(%target, "Target no longer scheduled, skipping");
            return Ok(CycleOutcome::Skipped);
        }

        let jobs = self.handler.list_jobs(target).await?;

        let outcome = if let Some(job) = self.guard.outstanding(&jobs, Utc::now()) {
            debug!(%target, job_id = %job.id, state = ?job.state, "Poll job still outstanding");
            CycleOutcome::Deduplicated
        } else {
            match self.queue.enqueue(self.handler.build_job_spec(target)).await {
                Ok(job) => {
                    info!(%target, job_id = %job.id, "Poll job enqueued");
                    CycleOutcome::Enqueued(job.id)
                }
                Err(e) => {
                    warn!(%target, error = %e, "Failed to enqueue poll job");
                    CycleOutcome::EnqueueFailed
                }
            }
        };

        self.handler.advance(target, Utc::now()).await?;

        Ok(outcome)
    }

    /// Idle sleep; false once cancelled
    async fn idle(&self) -> bool {
        !matches!(self.sleep(self.idle_interval).await, Wake::Cancelled)
    }

    async fn sleep(&self, duration: Duration) -> Wake {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Wake::Cancelled,
            _ = self.wake.notified() => Wake::Notified,
            _ = tokio::time::sleep(duration) => Wake::Due,
        }
    }

    fn set_state(&self, state: LoopState) {
        self.state.send_replace(state);
    }
}
