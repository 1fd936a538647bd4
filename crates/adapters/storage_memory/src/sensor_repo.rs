//! In-memory implementation of [`SensorRepository`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::RwLock;

use sensorhub_app::Context;
use sensorhub_app::ports::SensorRepository;
use sensorhub_domain::error::{HubError, NotFoundError};
use sensorhub_domain::id::SensorId;
use sensorhub_domain::sensor::Sensor;
use sensorhub_domain::time::now;

#[derive(Debug, Default)]
struct Table {
    next_id: i64,
    by_id: HashMap<SensorId, Sensor>,
    by_serial: HashMap<String, SensorId>,
}

impl Table {
    fn insert(&mut self, mut sensor: Sensor) -> Sensor {
        if let Some(id) = self.by_serial.get(&sensor.serial_number)
            && let Some(existing) = self.by_id.get(id)
        {
            return existing.clone();
        }
        self.next_id += 1;
        let id = SensorId::new(self.next_id);
        sensor.id = Some(id);
        sensor.registered_at = now();
        self.by_serial.insert(sensor.serial_number.clone(), id);
        self.by_id.insert(id, sensor.clone());
        sensor
    }

    fn update(&mut self, id: SensorId, sensor: Sensor) -> Result<Sensor, HubError> {
        let stored = self
            .by_id
            .get_mut(&id)
            .ok_or_else(|| NotFoundError::sensor(id))?;
        stored.current_state = sensor.current_state;
        stored.last_activity = sensor.last_activity;
        stored.description = sensor.description;
        stored.is_active = sensor.is_active;
        Ok(stored.clone())
    }
}

/// Sensor store held in process memory.
///
/// A single lock covers the id counter, the records and the serial-number
/// index, so assigning an id and inserting happen as one step.
#[derive(Debug, Clone, Default)]
pub struct InMemorySensorRepository {
    table: Arc<RwLock<Table>>,
}

impl InMemorySensorRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SensorRepository for InMemorySensorRepository {
    fn save(
        &self,
        ctx: &Context,
        sensor: Sensor,
    ) -> impl Future<Output = Result<Sensor, HubError>> + Send {
        let ctx = ctx.clone();
        let table = Arc::clone(&self.table);
        async move {
            ctx.check()?;
            let mut table = table.write().await;
            match sensor.id {
                Some(id) => table.update(id, sensor),
                None => {
                    let saved = table.insert(sensor);
                    tracing::trace!(id = ?saved.id, "sensor stored");
                    Ok(saved)
                }
            }
        }
    }

    fn get_all(&self, ctx: &Context) -> impl Future<Output = Result<Vec<Sensor>, HubError>> + Send {
        let ctx = ctx.clone();
        let table = Arc::clone(&self.table);
        async move {
            ctx.check()?;
            let table = table.read().await;
            Ok(table.by_id.values().cloned().collect())
        }
    }

    fn get_by_id(
        &self,
        ctx: &Context,
        id: SensorId,
    ) -> impl Future<Output = Result<Sensor, HubError>> + Send {
        let ctx = ctx.clone();
        let table = Arc::clone(&self.table);
        async move {
            ctx.check()?;
            let table = table.read().await;
            table
                .by_id
                .get(&id)
                .cloned()
                .ok_or_else(|| NotFoundError::sensor(id).into())
        }
    }

    fn get_by_serial_number(
        &self,
        ctx: &Context,
        serial_number: &str,
    ) -> impl Future<Output = Result<Sensor, HubError>> + Send {
        let ctx = ctx.clone();
        let table = Arc::clone(&self.table);
        let serial_number = serial_number.to_owned();
        async move {
            ctx.check()?;
            let table = table.read().await;
            table
                .by_serial
                .get(&serial_number)
                .and_then(|id| table.by_id.get(id))
                .cloned()
                .ok_or_else(|| NotFoundError::sensor(serial_number).into())
        }
    }
}
