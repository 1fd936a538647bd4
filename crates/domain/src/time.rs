//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp used for event times, `registered_at`, `last_activity`.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Whether `ts` lies in the closed interval `[start, end]`.
#[must_use]
pub fn within(ts: Timestamp, start: Timestamp, end: Timestamp) -> bool {
    start <= ts && ts <= end
}
