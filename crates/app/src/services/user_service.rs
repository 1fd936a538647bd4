//! User service — users and sensor ownership.

use sensorhub_domain::error::{HubError, NotFoundError};
use sensorhub_domain::id::{SensorId, UserId};
use sensorhub_domain::sensor::Sensor;
use sensorhub_domain::user::{SensorOwner, User};

use crate::context::Context;
use crate::ports::{SensorOwnerRepository, SensorRepository, UserRepository};

/// Application service for users and the sensors they own.
pub struct UserService<UR, OR, SR> {
    users: UR,
    owners: OR,
    sensors: SR,
}

impl<UR, OR, SR> UserService<UR, OR, SR>
where
    UR: UserRepository,
    OR: SensorOwnerRepository,
    SR: SensorRepository,
{
    /// Create a new service backed by the given repositories.
    pub fn new(users: UR, owners: OR, sensors: SR) -> Self {
        Self {
            users,
            owners,
            sensors,
        }
    }

    /// Register a user.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidUserName`](sensorhub_domain::error::ValidationError::InvalidUserName)
    /// for an empty name, before touching storage.
    #[tracing::instrument(skip(self, ctx, user), fields(name = %user.name))]
    pub async fn register_user(&self, ctx: &Context, user: User) -> Result<User, HubError> {
        ctx.check()?;
        user.validate()?;
        self.users.save(ctx, user).await
    }

    /// Link a sensor to a user. Linking twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::NotFound`] when either side is missing.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn attach_sensor_to_user(
        &self,
        ctx: &Context,
        user_id: UserId,
        sensor_id: SensorId,
    ) -> Result<SensorOwner, HubError> {
        ctx.check()?;
        self.users.get_by_id(ctx, user_id).await?;
        self.sensors.get_by_id(ctx, sensor_id).await?;

        let owner = SensorOwner { user_id, sensor_id };
        self.owners.save(ctx, owner).await?;
        Ok(owner)
    }

    /// Every sensor linked to a user.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::NotFound`] when the user does not exist. A link
    /// pointing at a sensor that no longer resolves is reported as a
    /// missing sensor.
    pub async fn user_sensors(&self, ctx: &Context, user_id: UserId) -> Result<Vec<Sensor>, HubError> {
        ctx.check()?;
        self.users.get_by_id(ctx, user_id).await?;

        let links = self.owners.get_by_user_id(ctx, user_id).await?;
        let mut sensors = Vec::with_capacity(links.len());
        for link in links {
            let sensor = self
                .sensors
                .get_by_id(ctx, link.sensor_id)
                .await
                .map_err(|err| match err {
                    HubError::NotFound(_) => NotFoundError::sensor(link.sensor_id).into(),
                    other => other,
                })?;
            sensors.push(sensor);
        }
        Ok(sensors)
    }
}
