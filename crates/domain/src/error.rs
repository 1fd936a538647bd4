//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`HubError`]
//! via `#[from]`. Validation and not-found failures are kept apart from
//! infrastructure failures so transports can map them independently.

/// Top-level error returned by use cases and repository ports.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// Input rejected before any storage access.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// The requested record does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The caller cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,

    /// The caller's deadline elapsed before the operation ran.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// A storage backend failed.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl HubError {
    /// Whether this error reports a missing record.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Domain rule violations, detected before touching storage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("wrong sensor type: {0:?}")]
    WrongSensorType(String),

    #[error("wrong sensor serial number: {0:?}")]
    WrongSensorSerialNumber(String),

    #[error("invalid event timestamp")]
    InvalidEventTimestamp,

    #[error("invalid user name")]
    InvalidUserName,

    #[error("invalid time frame: start is after end")]
    InvalidTimeFrame,

    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),
}

/// A lookup resolved to zero records.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} not found: {id}")]
pub struct NotFoundError {
    /// Kind of record that was looked up (`Sensor`, `Event`, `User`).
    pub entity: &'static str,
    /// The key used for the lookup, rendered for diagnostics.
    pub id: String,
}

impl NotFoundError {
    #[must_use]
    pub fn sensor(id: impl ToString) -> Self {
        Self {
            entity: "Sensor",
            id: id.to_string(),
        }
    }

    #[must_use]
    pub fn event(sensor_id: impl ToString) -> Self {
        Self {
            entity: "Event",
            id: sensor_id.to_string(),
        }
    }

    #[must_use]
    pub fn user(id: impl ToString) -> Self {
        Self {
            entity: "User",
            id: id.to_string(),
        }
    }
}
