//! Scheduler errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("enqueue failed: {0}")]
    Enqueue(String),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
