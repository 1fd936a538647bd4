//! In-memory implementation of [`EventRepository`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::RwLock;

use sensorhub_app::Context;
use sensorhub_app::ports::EventRepository;
use sensorhub_domain::error::{HubError, NotFoundError};
use sensorhub_domain::event::Event;
use sensorhub_domain::id::SensorId;
use sensorhub_domain::time::{Timestamp, within};

/// Append-only event log, one list per sensor.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventRepository {
    events: Arc<RwLock<HashMap<SensorId, Vec<Event>>>>,
}

impl InMemoryEventRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventRepository for InMemoryEventRepository {
    fn save(&self, ctx: &Context, event: Event) -> impl Future<Output = Result<Event, HubError>> + Send {
        let ctx = ctx.clone();
        let events = Arc::clone(&self.events);
        async move {
            ctx.check()?;
            events
                .write()
                .await
                .entry(event.sensor_id)
                .or_default()
                .push(event.clone());
            Ok(event)
        }
    }

    fn get_last_by_sensor_id(
        &self,
        ctx: &Context,
        sensor_id: SensorId,
    ) -> impl Future<Output = Result<Event, HubError>> + Send {
        let ctx = ctx.clone();
        let events = Arc::clone(&self.events);
        async move {
            ctx.check()?;
            let events = events.read().await;
            events
                .get(&sensor_id)
                .and_then(|list| list.iter().max_by_key(|e| e.timestamp))
                .cloned()
                .ok_or_else(|| NotFoundError::event(sensor_id).into())
        }
    }

    fn get_by_time_frame(
        &self,
        ctx: &Context,
        sensor_id: SensorId,
        start: Timestamp,
        end: Timestamp,
    ) -> impl Future<Output = Result<Vec<Event>, HubError>> + Send {
        let ctx = ctx.clone();
        let events = Arc::clone(&self.events);
        async move {
            ctx.check()?;
            let events = events.read().await;
            Ok(events
                .get(&sensor_id)
                .map(|list| {
                    list.iter()
                        .filter(|e| within(e.timestamp, start, end))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default())
        }
    }
}
