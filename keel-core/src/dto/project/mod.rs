//! Project DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::poll::PollConfig;
use crate::domain::project::Project;

/// Request to create or update a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertProject {
    pub name: String,
    #[serde(default)]
    pub data_source: Option<serde_json::Value>,
    #[serde(default)]
    pub data_source_poll: PollConfig,
    /// Applications to create or update alongside the project
    #[serde(default)]
    pub applications: Vec<ApplicationConfig>,
}

/// Application entry inside a project upsert
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    pub name: String,
    #[serde(default)]
    pub status_report_poll: PollConfig,
}

/// Summary information about a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub name: String,
    pub poll_enabled: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<Project> for ProjectSummary {
    fn from(project: Project) -> Self {
        ProjectSummary {
            name: project.name,
            poll_enabled: project.data_source_poll.enabled,
            updated_at: project.updated_at,
        }
    }
}
