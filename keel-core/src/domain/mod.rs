//! Core domain types
//!
//! This module contains the core domain structures used across Keel.
//! These types represent the entities the orchestrator persists and the
//! poll scheduler acts upon.

pub mod application;
pub mod job;
pub mod poll;
pub mod project;
