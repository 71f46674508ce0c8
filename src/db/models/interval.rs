use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A completed span of activity. Created only by the stop transition and
/// immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Interval {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

/// The single not-yet-closed interval. The backing table holds zero or one
/// rows at all times.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActiveInterval {
    pub started_at: DateTime<Utc>,
}
