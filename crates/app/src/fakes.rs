//! Hand-written repository doubles shared by the use-case tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use sensorhub_domain::error::{HubError, NotFoundError};
use sensorhub_domain::event::Event;
use sensorhub_domain::id::{SensorId, UserId};
use sensorhub_domain::sensor::Sensor;
use sensorhub_domain::time::{Timestamp, now, within};
use sensorhub_domain::user::{SensorOwner, User};

use crate::context::Context;
use crate::ports::{EventRepository, SensorOwnerRepository, SensorRepository, UserRepository};

pub fn storage_error() -> HubError {
    HubError::Storage(Box::new(std::io::Error::other("disk on fire")))
}

#[derive(Default)]
struct SensorTable {
    next_id: i64,
    by_id: HashMap<SensorId, Sensor>,
}

/// Map-backed sensor store that counts calls.
#[derive(Default)]
pub struct FakeSensorRepo {
    table: Mutex<SensorTable>,
    broken: bool,
    fail_updates: bool,
    pub saves: AtomicUsize,
    pub lookups: AtomicUsize,
}

impl FakeSensorRepo {
    /// A store whose every call fails with a storage error.
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }

    /// A store that inserts and reads normally but fails every update.
    pub fn failing_updates() -> Self {
        Self {
            fail_updates: true,
            ..Self::default()
        }
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn count(&self) -> usize {
        self.table.lock().unwrap().by_id.len()
    }
}

impl SensorRepository for FakeSensorRepo {
    async fn save(&self, ctx: &Context, mut sensor: Sensor) -> Result<Sensor, HubError> {
        ctx.check()?;
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.broken {
            return Err(storage_error());
        }
        if self.fail_updates && sensor.id.is_some() {
            return Err(storage_error());
        }
        let mut table = self.table.lock().unwrap();
        if let Some(id) = sensor.id {
            table.by_id.insert(id, sensor.clone());
            return Ok(sensor);
        }
        if let Some(existing) = table
            .by_id
            .values()
            .find(|s| s.serial_number == sensor.serial_number)
        {
            return Ok(existing.clone());
        }
        table.next_id += 1;
        let id = SensorId::new(table.next_id);
        sensor.id = Some(id);
        sensor.registered_at = now();
        table.by_id.insert(id, sensor.clone());
        Ok(sensor)
    }

    async fn get_all(&self, ctx: &Context) -> Result<Vec<Sensor>, HubError> {
        ctx.check()?;
        if self.broken {
            return Err(storage_error());
        }
        Ok(self.table.lock().unwrap().by_id.values().cloned().collect())
    }

    async fn get_by_id(&self, ctx: &Context, id: SensorId) -> Result<Sensor, HubError> {
        ctx.check()?;
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.broken {
            return Err(storage_error());
        }
        self.table
            .lock()
            .unwrap()
            .by_id
            .get(&id)
            .cloned()
            .ok_or_else(|| NotFoundError::sensor(id).into())
    }

    async fn get_by_serial_number(
        &self,
        ctx: &Context,
        serial_number: &str,
    ) -> Result<Sensor, HubError> {
        ctx.check()?;
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.broken {
            return Err(storage_error());
        }
        self.table
            .lock()
            .unwrap()
            .by_id
            .values()
            .find(|s| s.serial_number == serial_number)
            .cloned()
            .ok_or_else(|| NotFoundError::sensor(serial_number).into())
    }
}

/// Sensor store that fails the test on any call.
pub struct UntouchableSensorRepo;

impl SensorRepository for UntouchableSensorRepo {
    async fn save(&self, _ctx: &Context, _sensor: Sensor) -> Result<Sensor, HubError> {
        panic!("save must not be called");
    }

    async fn get_all(&self, _ctx: &Context) -> Result<Vec<Sensor>, HubError> {
        panic!("get_all must not be called");
    }

    async fn get_by_id(&self, _ctx: &Context, _id: SensorId) -> Result<Sensor, HubError> {
        panic!("get_by_id must not be called");
    }

    async fn get_by_serial_number(
        &self,
        _ctx: &Context,
        _serial_number: &str,
    ) -> Result<Sensor, HubError> {
        panic!("get_by_serial_number must not be called");
    }
}

/// Vec-backed event store; can be told to fail appends.
#[derive(Default)]
pub struct FakeEventRepo {
    events: Mutex<Vec<Event>>,
    pub fail_saves: bool,
}

impl FakeEventRepo {
    pub fn failing() -> Self {
        Self {
            fail_saves: true,
            ..Self::default()
        }
    }

    pub fn count(&self) -> usize {
        self.events.lock().unwrap().len()
    }
}

impl EventRepository for FakeEventRepo {
    async fn save(&self, ctx: &Context, event: Event) -> Result<Event, HubError> {
        ctx.check()?;
        if self.fail_saves {
            return Err(storage_error());
        }
        self.events.lock().unwrap().push(event.clone());
        Ok(event)
    }

    async fn get_last_by_sensor_id(
        &self,
        ctx: &Context,
        sensor_id: SensorId,
    ) -> Result<Event, HubError> {
        ctx.check()?;
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.sensor_id == sensor_id)
            .max_by_key(|e| e.timestamp)
            .cloned()
            .ok_or_else(|| NotFoundError::event(sensor_id).into())
    }

    async fn get_by_time_frame(
        &self,
        ctx: &Context,
        sensor_id: SensorId,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<Event>, HubError> {
        ctx.check()?;
        Ok(self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.sensor_id == sensor_id && within(e.timestamp, start, end))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct FakeUserRepo {
    users: Mutex<Vec<User>>,
}

impl UserRepository for FakeUserRepo {
    async fn save(&self, ctx: &Context, mut user: User) -> Result<User, HubError> {
        ctx.check()?;
        let mut users = self.users.lock().unwrap();
        let next = i64::try_from(users.len()).unwrap() + 1;
        user.id = Some(UserId::new(next));
        users.push(user.clone());
        Ok(user)
    }

    async fn get_by_id(&self, ctx: &Context, id: UserId) -> Result<User, HubError> {
        ctx.check()?;
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == Some(id))
            .cloned()
            .ok_or_else(|| NotFoundError::user(id).into())
    }
}

#[derive(Default)]
pub struct FakeOwnerRepo {
    links: Mutex<Vec<SensorOwner>>,
}

impl SensorOwnerRepository for FakeOwnerRepo {
    async fn save(&self, ctx: &Context, owner: SensorOwner) -> Result<(), HubError> {
        ctx.check()?;
        let mut links = self.links.lock().unwrap();
        if !links.contains(&owner) {
            links.push(owner);
        }
        Ok(())
    }

    async fn get_by_user_id(
        &self,
        ctx: &Context,
        user_id: UserId,
    ) -> Result<Vec<SensorOwner>, HubError> {
        ctx.check()?;
        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.user_id == user_id)
            .copied()
            .collect())
    }
}
