use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::Interval;

/// Result of a start request. Starting while an interval is already open is
/// a no-op, not an error.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "status")]
pub enum StartOutcome {
    Created { started_at: DateTime<Utc> },
    AlreadyRunning,
}

/// Result of a stop request. Stopping with nothing open is a no-op.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "status")]
pub enum StopOutcome {
    Closed { interval: Interval },
    NoActiveInterval,
}
