//! Repository Module
//!
//! Data access layer for the orchestrator.
//! Each repository handles database operations for a specific domain entity.

pub mod application;
pub mod job;
pub mod project;
pub mod schedule;

// Re-export for convenience
pub use application as application_repository;
pub use job as job_repository;
pub use project as project_repository;
pub use schedule as schedule_repository;
