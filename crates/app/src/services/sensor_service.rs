//! Sensor service — registration and lookup.

use sensorhub_domain::error::HubError;
use sensorhub_domain::id::SensorId;
use sensorhub_domain::sensor::{Sensor, SensorRegistration};

use crate::context::Context;
use crate::ports::SensorRepository;

/// Application service for sensor registration and reads.
pub struct SensorService<R> {
    repo: R,
}

impl<R: SensorRepository> SensorService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Register a sensor, or return the existing one for the same serial number.
    ///
    /// Registration is idempotent by serial number: when a sensor is already
    /// stored, it is returned unchanged and the proposed type, description and
    /// activity flag are discarded. The first registration wins.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] for an unknown type or malformed
    /// serial number (before any repository access), or any lookup/persist
    /// failure from the repository, unchanged.
    #[tracing::instrument(skip(self, ctx, registration), fields(serial_number = %registration.serial_number))]
    pub async fn register_sensor(
        &self,
        ctx: &Context,
        registration: SensorRegistration,
    ) -> Result<Sensor, HubError> {
        ctx.check()?;
        let sensor = registration.into_sensor()?;

        match self
            .repo
            .get_by_serial_number(ctx, &sensor.serial_number)
            .await
        {
            Ok(existing) => {
                tracing::debug!(id = ?existing.id, "sensor already registered");
                Ok(existing)
            }
            Err(err) if err.is_not_found() => self.repo.save(ctx, sensor).await,
            Err(err) => Err(err),
        }
    }

    /// List all sensors.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Cancelled`] if the context is already signalled,
    /// or a storage error propagated from the repository.
    pub async fn list_sensors(&self, ctx: &Context) -> Result<Vec<Sensor>, HubError> {
        ctx.check()?;
        self.repo.get_all(ctx).await
    }

    /// Look up a sensor by id.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::NotFound`] when no sensor with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn get_sensor(&self, ctx: &Context, id: SensorId) -> Result<Sensor, HubError> {
        ctx.check()?;
        self.repo.get_by_id(ctx, id).await
    }
}
