//! Keel Core
//!
//! Core types and abstractions for the Keel poll scheduler.
//!
//! This crate contains:
//! - Domain types: Core business entities (Project, Application, Job, poll targets)
//! - DTOs: Request and response shapes for the orchestrator API
//! - Interval parsing for operator-supplied poll intervals

pub mod domain;
pub mod dto;
pub mod interval;
