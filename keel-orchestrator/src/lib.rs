//! Keel Orchestrator
//!
//! Control plane service that stores projects and applications and keeps
//! their recurring poll jobs flowing.
//!
//! Architecture:
//! - API: axum handlers over the service layer
//! - Services: business logic and validation
//! - Repositories: SQLite access, one module per table
//! - Scheduler: per-kind poll loops and their lifecycle

pub mod api;
pub mod config;
pub mod db;
pub mod repository;
pub mod scheduler;
pub mod service;

#[cfg(test)]
pub(crate) mod test_support;
