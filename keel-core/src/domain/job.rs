//! Job domain types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::poll::{PollTarget, TargetKind};

/// Job record
///
/// Created by the poll scheduler, mutated afterwards only by the job engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub target: PollTarget,
    pub operation: JobOperation,
    pub trigger: JobTrigger,
    pub state: JobState,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub error_message: Option<String>,
}

/// Job execution state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    Queued,
    Running,
    Complete,
    Error,
}

impl JobState {
    /// Terminal jobs no longer occupy their target
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Complete | JobState::Error)
    }
}

/// Work a job performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobOperation {
    /// Fetch a project's data source
    Poll,
    /// Produce an application status report
    StatusReport,
}

impl JobOperation {
    /// Operation the scheduler enqueues for a target kind
    pub fn for_kind(kind: TargetKind) -> Self {
        match kind {
            TargetKind::Project => JobOperation::Poll,
            TargetKind::Application => JobOperation::StatusReport,
        }
    }
}

/// What caused a job to be created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobTrigger {
    Poll,
    Manual,
}

/// Specification handed to the job queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    pub target: PollTarget,
    pub operation: JobOperation,
    pub trigger: JobTrigger,
}

impl JobSpec {
    /// Poll-triggered job for a target
    pub fn poll(target: PollTarget) -> Self {
        let operation = JobOperation::for_kind(target.kind());
        Self {
            target,
            operation,
            trigger: JobTrigger::Poll,
        }
    }
}
