//! Poll introspection DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::poll::PollTarget;

/// Soonest due target of a kind, as reported by a peek
///
/// Both fields are `None` when nothing of that kind is scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollPeek {
    pub target: Option<PollTarget>,
    pub next_poll_at: Option<DateTime<Utc>>,
}

impl From<Option<(PollTarget, DateTime<Utc>)>> for PollPeek {
    fn from(peeked: Option<(PollTarget, DateTime<Utc>)>) -> Self {
        match peeked {
            Some((target, next_poll_at)) => PollPeek {
                target: Some(target),
                next_poll_at: Some(next_poll_at),
            },
            None => PollPeek {
                target: None,
                next_poll_at: None,
            },
        }
    }
}
