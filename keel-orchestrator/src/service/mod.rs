//! Service Module
//!
//! Business logic layer for the orchestrator.
//! Services orchestrate between repositories and contain domain logic.

pub mod application;
pub mod job;
pub mod project;

// Re-export for convenience
pub use application as application_service;
pub use job as job_service;
pub use project as project_service;
