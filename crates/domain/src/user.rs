//! User and sensor ownership.

use serde::{Deserialize, Serialize};

use crate::error::{HubError, ValidationError};
use crate::id::{SensorId, UserId};

/// A person who may own sensors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned identity. `None` until the user is saved.
    pub id: Option<UserId>,
    pub name: String,
}

impl User {
    /// Create an unsaved user.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidUserName`] when `name` is empty.
    pub fn validate(&self) -> Result<(), HubError> {
        if self.name.is_empty() {
            return Err(ValidationError::InvalidUserName.into());
        }
        Ok(())
    }
}

/// Many-to-many link between a user and a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SensorOwner {
    pub user_id: UserId,
    pub sensor_id: SensorId,
}
