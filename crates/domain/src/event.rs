//! Event — one timestamped reading from a sensor.
//!
//! Events are immutable once stored; there is no update or delete.

use serde::{Deserialize, Serialize};

use crate::error::{HubError, ValidationError};
use crate::id::SensorId;
use crate::time::Timestamp;

/// A stored reading, bound to the sensor it was resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: Timestamp,
    /// Serial number as supplied by the ingesting client.
    pub sensor_serial_number: String,
    /// Resolved internally from the serial number, never client-supplied.
    pub sensor_id: SensorId,
    pub payload: i64,
}

/// A reading as submitted by a client, before its sensor is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingEvent {
    pub sensor_serial_number: String,
    pub payload: i64,
    /// Must be set explicitly by the caller.
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
}

impl IncomingEvent {
    /// Return the caller-supplied timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidEventTimestamp`] when it is unset or
    /// equal to the zero instant (Unix epoch).
    pub fn timestamp(&self) -> Result<Timestamp, HubError> {
        match self.timestamp {
            Some(ts) if ts != Timestamp::UNIX_EPOCH => Ok(ts),
            _ => Err(ValidationError::InvalidEventTimestamp.into()),
        }
    }

    /// Bind this reading to a resolved sensor.
    #[must_use]
    pub fn resolve(self, sensor_id: SensorId, timestamp: Timestamp) -> Event {
        Event {
            timestamp,
            sensor_serial_number: self.sensor_serial_number,
            sensor_id,
            payload: self.payload,
        }
    }
}

/// The message pushed to live-stream clients, one per delivered event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorStatus {
    pub timestamp: Timestamp,
    pub payload: i64,
}

impl From<&Event> for SensorStatus {
    fn from(event: &Event) -> Self {
        Self {
            timestamp: event.timestamp,
            payload: event.payload,
        }
    }
}
