//! Job DTOs

use serde::{Deserialize, Serialize};

/// Completion report sent by the job engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteJob {
    pub success: bool,
    #[serde(default)]
    pub error_message: Option<String>,
}
