//! Poll scheduler
//!
//! Drives recurring polling for projects and applications. One loop runs
//! per target kind: it waits until the soonest scheduled target is due,
//! enqueues a poll job unless one is still outstanding, then moves the
//! target's schedule forward.

pub mod dedup;
pub mod error;
pub mod handler;
pub mod manager;
pub mod poller;
pub mod queue;

pub use dedup::DedupGuard;
pub use error::{Result, SchedulerError};
pub use handler::{ApplicationPollHandler, PollHandler, ProjectPollHandler};
pub use manager::PollManager;
pub use poller::{CycleOutcome, LoopState, PollLoop};
pub use queue::{JobQueue, SqliteJobQueue};
