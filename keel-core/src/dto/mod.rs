//! Data Transfer Objects for the orchestrator API
//!
//! This module contains the request and response shapes exchanged with the
//! orchestrator's HTTP API. Domain types are used directly where they already
//! have the right shape.

pub mod application;
pub mod job;
pub mod poll;
pub mod project;
