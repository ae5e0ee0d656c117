//! Timestamp utilities

use chrono::{DateTime, Utc};

/// Get current UTC timestamp
///
/// All persisted timestamps in the catalog come from this function at the
/// moment of write; client-supplied times are never stored.
pub fn now() -> DateTime<Utc> {
    Utc::now()
}
