use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

/// Encodes an instant for storage. Paired with [`parse_datetime`]; the two
/// must round-trip exactly, including sub-second precision.
pub fn format_datetime(value: &DateTime<Utc>) -> String {
    value.to_rfc3339()
}

/// Decodes a stored timestamp. Accepts any RFC 3339 offset and normalizes to
/// UTC. A failure here means the stored data is corrupt, not that the caller
/// passed bad input.
pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("malformed {field} timestamp {value:?}"))
}
