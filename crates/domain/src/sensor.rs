//! Sensor — a physical device identified by a unique serial number.
//!
//! A sensor is created once, on the first registration of its serial number.
//! Afterwards only [`Sensor::current_state`] and [`Sensor::last_activity`]
//! change, and always together, driven by accepted events.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{HubError, ValidationError};
use crate::id::SensorId;
use crate::time::{Timestamp, now};

/// Number of digits a serial number must carry.
pub const SERIAL_NUMBER_DIGITS: usize = 10;

/// Kind of signal a sensor reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorType {
    /// Contact-closure sensor (open/closed).
    #[serde(rename = "cc")]
    ContactClosure,
    /// Analog-to-digital converter.
    #[serde(rename = "adc")]
    Adc,
}

impl SensorType {
    /// Wire representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ContactClosure => "cc",
            Self::Adc => "adc",
        }
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensorType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cc" => Ok(Self::ContactClosure),
            "adc" => Ok(Self::Adc),
            other => Err(ValidationError::WrongSensorType(other.to_owned())),
        }
    }
}

/// Check the serial number rule: exactly ten ASCII digits, in any
/// surrounding of non-digit characters.
#[must_use]
pub fn is_valid_serial_number(serial_number: &str) -> bool {
    serial_number.chars().filter(char::is_ascii_digit).count() == SERIAL_NUMBER_DIGITS
}

/// A registered sensor and its last known reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sensor {
    /// Store-assigned identity. `None` until the sensor is first saved.
    pub id: Option<SensorId>,
    pub serial_number: String,
    #[serde(rename = "type")]
    pub sensor_type: SensorType,
    /// Payload of the most recently accepted event.
    pub current_state: i64,
    pub description: String,
    pub is_active: bool,
    pub registered_at: Timestamp,
    /// Time the most recent event was accepted, if any.
    pub last_activity: Option<Timestamp>,
}

impl Sensor {
    /// Create a builder for constructing a [`Sensor`].
    #[must_use]
    pub fn builder() -> SensorBuilder {
        SensorBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] when the serial number does not
    /// carry exactly ten digits.
    pub fn validate(&self) -> Result<(), HubError> {
        if !is_valid_serial_number(&self.serial_number) {
            return Err(
                ValidationError::WrongSensorSerialNumber(self.serial_number.clone()).into(),
            );
        }
        Ok(())
    }

    /// Record an accepted reading. Both live-state fields come from the same
    /// event so readers never observe them out of step.
    pub fn record_reading(&mut self, payload: i64, at: Timestamp) {
        self.current_state = payload;
        self.last_activity = Some(at);
    }
}

/// Step-by-step builder for [`Sensor`].
#[derive(Debug, Default)]
pub struct SensorBuilder {
    id: Option<SensorId>,
    serial_number: Option<String>,
    sensor_type: Option<SensorType>,
    description: Option<String>,
    is_active: bool,
    registered_at: Option<Timestamp>,
}

impl SensorBuilder {
    #[must_use]
    pub fn id(mut self, id: SensorId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn serial_number(mut self, serial_number: impl Into<String>) -> Self {
        self.serial_number = Some(serial_number.into());
        self
    }

    #[must_use]
    pub fn sensor_type(mut self, sensor_type: SensorType) -> Self {
        self.sensor_type = Some(sensor_type);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn is_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    #[must_use]
    pub fn registered_at(mut self, registered_at: Timestamp) -> Self {
        self.registered_at = Some(registered_at);
        self
    }

    /// Consume the builder, validate, and return a [`Sensor`].
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] if the type is missing or the serial
    /// number is malformed.
    pub fn build(self) -> Result<Sensor, HubError> {
        let sensor_type = self
            .sensor_type
            .ok_or_else(|| ValidationError::WrongSensorType(String::new()))?;
        let sensor = Sensor {
            id: self.id,
            serial_number: self.serial_number.unwrap_or_default(),
            sensor_type,
            current_state: 0,
            description: self.description.unwrap_or_default(),
            is_active: self.is_active,
            registered_at: self.registered_at.unwrap_or_else(now),
            last_activity: None,
        };
        sensor.validate()?;
        Ok(sensor)
    }
}

/// A registration request as received from a client, before validation.
///
/// The type is carried as raw text so that an unknown kind is reported as
/// [`ValidationError::WrongSensorType`] rather than a decoding failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorRegistration {
    #[serde(rename = "type")]
    pub sensor_type: String,
    pub serial_number: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_active: bool,
}

impl SensorRegistration {
    /// Validate the request (type first, then serial number) and turn it
    /// into an unsaved [`Sensor`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::WrongSensorType`] or
    /// [`ValidationError::WrongSensorSerialNumber`].
    pub fn into_sensor(self) -> Result<Sensor, HubError> {
        let sensor_type = SensorType::from_str(&self.sensor_type)?;
        Sensor::builder()
            .serial_number(self.serial_number)
            .sensor_type(sensor_type)
            .description(self.description)
            .is_active(self.is_active)
            .build()
    }
}
