//! Event service — ingestion and reading queries.

use sensorhub_domain::error::{HubError, NotFoundError, ValidationError};
use sensorhub_domain::event::{Event, IncomingEvent};
use sensorhub_domain::id::SensorId;
use sensorhub_domain::time::{Timestamp, now};

use crate::context::Context;
use crate::ports::{EventRepository, SensorRepository};

/// Application service that ingests readings and keeps each sensor's live
/// state in step with its most recently accepted event.
pub struct EventService<ER, SR> {
    events: ER,
    sensors: SR,
}

impl<ER, SR> EventService<ER, SR>
where
    ER: EventRepository,
    SR: SensorRepository,
{
    /// Create a new service backed by the given repositories.
    pub fn new(events: ER, sensors: SR) -> Self {
        Self { events, sensors }
    }

    /// Accept a reading from a sensor.
    ///
    /// The event is appended first, then the sensor's `current_state` and
    /// `last_activity` are persisted. The two writes are not atomic: a crash
    /// between them leaves the event stored without the state update.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidEventTimestamp`] before any lookup
    /// when the timestamp is unset, [`HubError::NotFound`] when no sensor has
    /// the serial number, or any persist failure unchanged.
    #[tracing::instrument(skip(self, ctx, incoming), fields(serial_number = %incoming.sensor_serial_number))]
    pub async fn receive_event(
        &self,
        ctx: &Context,
        incoming: IncomingEvent,
    ) -> Result<Event, HubError> {
        ctx.check()?;
        let timestamp = incoming.timestamp()?;

        let mut sensor = self
            .sensors
            .get_by_serial_number(ctx, &incoming.sensor_serial_number)
            .await?;
        let sensor_id = sensor
            .id
            .ok_or_else(|| NotFoundError::sensor(&incoming.sensor_serial_number))?;

        sensor.record_reading(incoming.payload, now());
        let event = incoming.resolve(sensor_id, timestamp);

        let event = self.events.save(ctx, event).await?;
        self.sensors.save(ctx, sensor).await?;
        Ok(event)
    }

    /// The most recent event for a sensor.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::NotFound`] when the sensor has no events.
    pub async fn last_event(&self, ctx: &Context, sensor_id: SensorId) -> Result<Event, HubError> {
        ctx.check()?;
        self.events.get_last_by_sensor_id(ctx, sensor_id).await
    }

    /// All events for a sensor with `start <= timestamp <= end`, unordered.
    /// An inverted frame matches nothing.
    ///
    /// # Errors
    ///
    /// Returns a storage error from the repository.
    pub async fn events_in_time_frame(
        &self,
        ctx: &Context,
        sensor_id: SensorId,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<Event>, HubError> {
        ctx.check()?;
        if start > end {
            return Ok(Vec::new());
        }
        self.events
            .get_by_time_frame(ctx, sensor_id, start, end)
            .await
    }
}
