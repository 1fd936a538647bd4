//! Shared application state for axum handlers.

use std::sync::Arc;
use std::time::Duration;

use sensorhub_app::Context;
use sensorhub_app::live_stream::{ServiceSource, StreamSupervisor};
use sensorhub_app::ports::{
    EventRepository, SensorOwnerRepository, SensorRepository, UserRepository,
};
use sensorhub_app::services::event_service::EventService;
use sensorhub_app::services::sensor_service::SensorService;
use sensorhub_app::services::user_service::UserService;

use crate::metrics::HttpMetrics;

/// Poll cadence of live-stream sessions unless configured otherwise.
pub const DEFAULT_STREAM_INTERVAL: Duration = Duration::from_secs(5);
/// Upper bound on a single request's use-case calls unless configured otherwise.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Application state shared across all axum handlers.
///
/// Generic over the sensor, event, user and ownership repositories to avoid
/// dynamic dispatch. `Clone` is implemented manually so the repositories
/// themselves do not need to be `Clone`; only the `Arc` wrappers are cloned.
pub struct AppState<SR, ER, UR, OR> {
    pub sensor_service: Arc<SensorService<SR>>,
    pub event_service: Arc<EventService<ER, SR>>,
    pub user_service: Arc<UserService<UR, OR, SR>>,
    /// Owns the shutdown signal and tracks live-stream sessions.
    pub supervisor: StreamSupervisor,
    pub metrics: Arc<HttpMetrics>,
    pub stream_interval: Duration,
    pub request_timeout: Duration,
}

impl<SR, ER, UR, OR> Clone for AppState<SR, ER, UR, OR> {
    fn clone(&self) -> Self {
        Self {
            sensor_service: Arc::clone(&self.sensor_service),
            event_service: Arc::clone(&self.event_service),
            user_service: Arc::clone(&self.user_service),
            supervisor: self.supervisor.clone(),
            metrics: Arc::clone(&self.metrics),
            stream_interval: self.stream_interval,
            request_timeout: self.request_timeout,
        }
    }
}

impl<SR, ER, UR, OR> AppState<SR, ER, UR, OR>
where
    SR: SensorRepository + Send + Sync + 'static,
    ER: EventRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    OR: SensorOwnerRepository + Send + Sync + 'static,
{
    /// Create a new application state from service instances.
    pub fn new(
        sensor_service: SensorService<SR>,
        event_service: EventService<ER, SR>,
        user_service: UserService<UR, OR, SR>,
        supervisor: StreamSupervisor,
        metrics: HttpMetrics,
    ) -> Self {
        Self {
            sensor_service: Arc::new(sensor_service),
            event_service: Arc::new(event_service),
            user_service: Arc::new(user_service),
            supervisor,
            metrics: Arc::new(metrics),
            stream_interval: DEFAULT_STREAM_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_stream_interval(mut self, interval: Duration) -> Self {
        self.stream_interval = interval;
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Context for one request: cancelled on server shutdown, bounded by the
    /// request timeout.
    #[must_use]
    pub fn request_context(&self) -> Context {
        self.supervisor
            .session_context()
            .with_timeout(self.request_timeout)
    }

    /// Read side for a live-stream session.
    #[must_use]
    pub fn stream_source(&self) -> ServiceSource<SR, ER, SR> {
        ServiceSource::new(
            Arc::clone(&self.sensor_service),
            Arc::clone(&self.event_service),
        )
    }
}
