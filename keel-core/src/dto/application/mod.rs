//! Application DTOs

use serde::{Deserialize, Serialize};

/// Request to create or update an application
///
/// Fields left as `None` keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpsertApplication {
    pub name: String,
    /// Turn status report polling on or off
    #[serde(default)]
    pub poll: Option<bool>,
    /// New status report poll interval
    #[serde(default)]
    pub poll_interval: Option<String>,
}
