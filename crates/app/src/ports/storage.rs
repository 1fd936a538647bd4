//! Storage port — repository traits for persistence.
//!
//! Every method takes the caller's [`Context`] and must fail with
//! [`HubError::Cancelled`] / [`HubError::DeadlineExceeded`] before doing any
//! work once it is signalled. A lookup that resolves zero records must return
//! [`HubError::NotFound`], never an empty success.

use std::future::Future;
use std::sync::Arc;

use sensorhub_domain::error::HubError;
use sensorhub_domain::event::Event;
use sensorhub_domain::id::{SensorId, UserId};
use sensorhub_domain::sensor::Sensor;
use sensorhub_domain::time::Timestamp;
use sensorhub_domain::user::{SensorOwner, User};

use crate::context::Context;

/// Repository for [`Sensor`]s.
pub trait SensorRepository {
    /// Insert the sensor if it has no id yet, otherwise update it in place.
    ///
    /// On insert the store assigns `id` and `registered_at`. Inserting a
    /// sensor whose serial number is already registered must not create a
    /// second record: the stored sensor is returned unchanged instead.
    fn save(
        &self,
        ctx: &Context,
        sensor: Sensor,
    ) -> impl Future<Output = Result<Sensor, HubError>> + Send;

    /// List every stored sensor, in no particular order.
    fn get_all(&self, ctx: &Context) -> impl Future<Output = Result<Vec<Sensor>, HubError>> + Send;

    /// Look a sensor up by its store-assigned id.
    fn get_by_id(
        &self,
        ctx: &Context,
        id: SensorId,
    ) -> impl Future<Output = Result<Sensor, HubError>> + Send;

    /// Look a sensor up by its serial number.
    fn get_by_serial_number(
        &self,
        ctx: &Context,
        serial_number: &str,
    ) -> impl Future<Output = Result<Sensor, HubError>> + Send;
}

/// Append-only repository for [`Event`]s.
pub trait EventRepository {
    /// Append an event.
    fn save(&self, ctx: &Context, event: Event)
    -> impl Future<Output = Result<Event, HubError>> + Send;

    /// The event with the greatest timestamp for `sensor_id`.
    fn get_last_by_sensor_id(
        &self,
        ctx: &Context,
        sensor_id: SensorId,
    ) -> impl Future<Output = Result<Event, HubError>> + Send;

    /// Every event for `sensor_id` with `start <= timestamp <= end`, in no
    /// guaranteed order.
    fn get_by_time_frame(
        &self,
        ctx: &Context,
        sensor_id: SensorId,
        start: Timestamp,
        end: Timestamp,
    ) -> impl Future<Output = Result<Vec<Event>, HubError>> + Send;
}

/// Repository for [`User`]s.
pub trait UserRepository {
    /// Insert a user, assigning its id.
    fn save(&self, ctx: &Context, user: User) -> impl Future<Output = Result<User, HubError>> + Send;

    /// Look a user up by id.
    fn get_by_id(
        &self,
        ctx: &Context,
        id: UserId,
    ) -> impl Future<Output = Result<User, HubError>> + Send;
}

/// Repository for user ↔ sensor links.
pub trait SensorOwnerRepository {
    /// Record a link. Saving the same link twice keeps a single record.
    fn save(
        &self,
        ctx: &Context,
        owner: SensorOwner,
    ) -> impl Future<Output = Result<(), HubError>> + Send;

    /// Every link for `user_id`; empty when the user owns nothing.
    fn get_by_user_id(
        &self,
        ctx: &Context,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<SensorOwner>, HubError>> + Send;
}

impl<T: SensorRepository + Send + Sync> SensorRepository for Arc<T> {
    fn save(
        &self,
        ctx: &Context,
        sensor: Sensor,
    ) -> impl Future<Output = Result<Sensor, HubError>> + Send {
        (**self).save(ctx, sensor)
    }

    fn get_all(&self, ctx: &Context) -> impl Future<Output = Result<Vec<Sensor>, HubError>> + Send {
        (**self).get_all(ctx)
    }

    fn get_by_id(
        &self,
        ctx: &Context,
        id: SensorId,
    ) -> impl Future<Output = Result<Sensor, HubError>> + Send {
        (**self).get_by_id(ctx, id)
    }

    fn get_by_serial_number(
        &self,
        ctx: &Context,
        serial_number: &str,
    ) -> impl Future<Output = Result<Sensor, HubError>> + Send {
        (**self).get_by_serial_number(ctx, serial_number)
    }
}

impl<T: EventRepository + Send + Sync> EventRepository for Arc<T> {
    fn save(
        &self,
        ctx: &Context,
        event: Event,
    ) -> impl Future<Output = Result<Event, HubError>> + Send {
        (**self).save(ctx, event)
    }

    fn get_last_by_sensor_id(
        &self,
        ctx: &Context,
        sensor_id: SensorId,
    ) -> impl Future<Output = Result<Event, HubError>> + Send {
        (**self).get_last_by_sensor_id(ctx, sensor_id)
    }

    fn get_by_time_frame(
        &self,
        ctx: &Context,
        sensor_id: SensorId,
        start: Timestamp,
        end: Timestamp,
    ) -> impl Future<Output = Result<Vec<Event>, HubError>> + Send {
        (**self).get_by_time_frame(ctx, sensor_id, start, end)
    }
}

impl<T: UserRepository + Send + Sync> UserRepository for Arc<T> {
    fn save(&self, ctx: &Context, user: User) -> impl Future<Output = Result<User, HubError>> + Send {
        (**self).save(ctx, user)
    }

    fn get_by_id(
        &self,
        ctx: &Context,
        id: UserId,
    ) -> impl Future<Output = Result<User, HubError>> + Send {
        (**self).get_by_id(ctx, id)
    }
}

impl<T: SensorOwnerRepository + Send + Sync> SensorOwnerRepository for Arc<T> {
    fn save(
        &self,
        ctx: &Context,
        owner: SensorOwner,
    ) -> impl Future<Output = Result<(), HubError>> + Send {
        (**self).save(ctx, owner)
    }

    fn get_by_user_id(
        &self,
        ctx: &Context,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<SensorOwner>, HubError>> + Send {
        (**self).get_by_user_id(ctx, user_id)
    }
}
