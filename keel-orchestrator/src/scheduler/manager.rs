//! Poll manager
//!
//! Owns the two poll loops and their shared cancellation token.

use keel_core::domain::poll::TargetKind;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::{Mutex, Notify, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::handler::{ApplicationPollHandler, PollHandler, ProjectPollHandler};
use super::poller::{LoopState, PollLoop};
use super::queue::{JobQueue, SqliteJobQueue};
use crate::config::SchedulerConfig;

struct LoopHandle {
    wake: Arc<Notify>,
    state: watch::Receiver<LoopState>,
}

/// Running poll scheduler
///
/// Dropping the manager cancels both loops without waiting for them; call
/// [`PollManager::close`] to wait until they have stopped.
pub struct PollManager {
    cancel: CancellationToken,
    handles: Mutex<Vec<JoinHandle<()>>>,
    project: LoopHandle,
    application: LoopHandle,
}

impl PollManager {
    /// Starts both loops, queueing jobs in the jobs table
    pub fn start(pool: SqlitePool, config: SchedulerConfig) -> Self {
        let queue = Arc::new(SqliteJobQueue::new(pool.clone()));
        Self::start_with_queue(pool, queue, config)
    }

    /// Starts both loops with a custom job queue
    pub fn start_with_queue(
        pool: SqlitePool,
        queue: Arc<dyn JobQueue>,
        config: SchedulerConfig,
    ) -> Self {
        let cancel = CancellationToken::new();
        let mut handles = Vec::with_capacity(2);

        let project = spawn_loop(
            ProjectPollHandler::new(pool.clone()),
            Arc::clone(&queue),
            &config,
            &cancel,
            &mut handles,
        );
        let application = spawn_loop(
            ApplicationPollHandler::new(pool),
            queue,
            &config,
            &cancel,
            &mut handles,
        );

        info!(
            idle_interval = ?config.idle_interval,
            stale_job_timeout = ?config.stale_job_timeout,
            "Poll scheduler started"
        );

        Self {
            cancel,
            handles: Mutex::new(handles),
            project,
            application,
        }
    }

    /// Make the loop for `kind` re-read its schedule now
    pub fn wake(&self, kind: TargetKind) {
        self.loop_handle(kind).wake.notify_one();
    }

    /// Current state of the loop for `kind`
    pub fn state(&self, kind: TargetKind) -> LoopState {
        *self.loop_handle(kind).state.borrow()
    }

    /// Stops both loops and waits for them to exit
    ///
    /// No job is queued after this returns. Safe to call more than once.
    pub async fn close(&self) {
        self.cancel.cancel();

        let mut handles = self.handles.lock().await;
        for handle in handles.drain(..) {
            if let Err(e) = handle.await {
                error!("Poll loop task failed: {}", e);
            }
        }

        info!("Poll scheduler shut down");
    }

    fn loop_handle(&self, kind: TargetKind) -> &LoopHandle {
        match kind {
            TargetKind::Project => &self.project,
            TargetKind::Application => &self.application,
        }
    }
}

impl Drop for PollManager {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn spawn_loop<H: PollHandler>(
    handler: H,
    queue: Arc<dyn JobQueue>,
    config: &SchedulerConfig,
    cancel: &CancellationToken,
    handles: &mut Vec<JoinHandle<()>>,
) -> LoopHandle {
    let poll_loop = PollLoop::new(handler, queue, config, cancel.child_token());
    let loop_handle = LoopHandle {
        wake: poll_loop.wake_handle(),
        state: poll_loop.subscribe(),
    };

    handles.push(tokio::spawn(poll_loop.run()));
    loop_handle
}
