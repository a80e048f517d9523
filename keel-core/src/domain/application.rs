//! Application domain types

use serde::{Deserialize, Serialize};

use crate::domain::poll::PollConfig;

/// An application within a project
///
/// Status report polling is configured per application and is independent
/// of the owning project's data source polling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub project: String,
    pub name: String,
    pub status_report_poll: PollConfig,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
