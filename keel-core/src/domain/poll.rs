//! Poll domain types
//!
//! A poll target is anything the scheduler enqueues recurring work for.
//! Projects poll their data source; applications produce status reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::interval::{IntervalError, parse_interval};

/// The kind of entity being polled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Project,
    Application,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Project => "project",
            TargetKind::Application => "application",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "project" => Ok(TargetKind::Project),
            "application" => Ok(TargetKind::Application),
            other => Err(format!("unknown poll target kind: {}", other)),
        }
    }
}

/// Identity of a single pollable entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PollTarget {
    Project { project: String },
    Application { project: String, application: String },
}

impl PollTarget {
    pub fn project(project: impl Into<String>) -> Self {
        PollTarget::Project {
            project: project.into(),
        }
    }

    pub fn application(project: impl Into<String>, application: impl Into<String>) -> Self {
        PollTarget::Application {
            project: project.into(),
            application: application.into(),
        }
    }

    pub fn kind(&self) -> TargetKind {
        match self {
            PollTarget::Project { .. } => TargetKind::Project,
            PollTarget::Application { .. } => TargetKind::Application,
        }
    }

    /// Name of the project that owns this target
    pub fn project_name(&self) -> &str {
        match self {
            PollTarget::Project { project } => project,
            PollTarget::Application { project, .. } => project,
        }
    }

    /// Application name, if this is an application target
    pub fn application_name(&self) -> Option<&str> {
        match self {
            PollTarget::Project { .. } => None,
            PollTarget::Application { application, .. } => Some(application),
        }
    }
}

impl fmt::Display for PollTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollTarget::Project { project } => write!(f, "project {:?}", project),
            PollTarget::Application {
                project,
                application,
            } => write!(f, "application \"{}/{}\"", project, application),
        }
    }
}

/// Operator-facing poll configuration
///
/// The interval is kept as written by the operator and parsed on demand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollConfig {
    pub enabled: bool,
    #[serde(default)]
    pub interval: String,
}

impl PollConfig {
    pub fn enabled(interval: impl Into<String>) -> Self {
        Self {
            enabled: true,
            interval: interval.into(),
        }
    }

    /// Parsed interval
    ///
    /// A disabled config with no interval yields a zero duration; an enabled
    /// config must carry a valid, non-zero interval.
    pub fn parsed_interval(&self) -> Result<Duration, IntervalError> {
        if !self.enabled && self.interval.trim().is_empty() {
            return Ok(Duration::ZERO);
        }
        parse_interval(&self.interval)
    }
}

/// Persisted schedule for one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollSchedule {
    pub target: PollTarget,
    pub enabled: bool,
    pub interval: Duration,
    pub next_poll_at: Option<DateTime<Utc>>,
}
