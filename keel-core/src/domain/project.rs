//! Project domain types

use serde::{Deserialize, Serialize};

use crate::domain::poll::PollConfig;

/// A project owning a data source and a set of applications
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    /// Data source configuration, opaque to the scheduler
    pub data_source: Option<serde_json::Value>,
    pub data_source_poll: PollConfig,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
