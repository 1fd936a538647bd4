//! Live-stream session — a per-client poller that forwards new readings.
//!
//! A session is opened with [`LiveStream::connect`], which confirms the sensor
//! exists, and driven with [`LiveStream::run`] until the peer goes away, a
//! push fails, or the shutdown token fires. Every session is tracked by a
//! [`StreamSupervisor`] so the process can drain them on exit.
//!
//! The session owns nothing shared: its timer, its last-pushed timestamp and
//! its sink belong to it alone.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use sensorhub_domain::error::HubError;
use sensorhub_domain::event::Event;
use sensorhub_domain::id::SensorId;
use sensorhub_domain::time::Timestamp;

use crate::context::Context;
use crate::ports::{EventRepository, SensorRepository};
use crate::services::event_service::EventService;
use crate::services::sensor_service::SensorService;

/// Read side a session polls.
pub trait StreamSource {
    /// Resolve to `Ok(())` when the sensor is known.
    fn sensor_exists(
        &self,
        ctx: &Context,
        sensor_id: SensorId,
    ) -> impl Future<Output = Result<(), HubError>> + Send;

    /// The latest event recorded for the sensor.
    fn latest_event(
        &self,
        ctx: &Context,
        sensor_id: SensorId,
    ) -> impl Future<Output = Result<Event, HubError>> + Send;
}

/// Where a session delivers readings.
pub trait EventSink {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Deliver one reading to the client.
    fn push(&mut self, event: &Event) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Resolve once the remote peer has closed the connection.
    ///
    /// Must be cancel-safe: the session drops this future on every tick.
    fn closed(&mut self) -> impl Future<Output = ()> + Send;
}

/// [`StreamSource`] backed by the sensor and event use cases.
pub struct ServiceSource<SR, ER, ESR> {
    sensors: Arc<SensorService<SR>>,
    events: Arc<EventService<ER, ESR>>,
}

impl<SR, ER, ESR> ServiceSource<SR, ER, ESR> {
    pub fn new(sensors: Arc<SensorService<SR>>, events: Arc<EventService<ER, ESR>>) -> Self {
        Self { sensors, events }
    }
}

impl<SR, ER, ESR> Clone for ServiceSource<SR, ER, ESR> {
    fn clone(&self) -> Self {
        Self {
            sensors: Arc::clone(&self.sensors),
            events: Arc::clone(&self.events),
        }
    }
}

impl<SR, ER, ESR> StreamSource for ServiceSource<SR, ER, ESR>
where
    SR: SensorRepository + Send + Sync,
    ER: EventRepository + Send + Sync,
    ESR: SensorRepository + Send + Sync,
{
    async fn sensor_exists(&self, ctx: &Context, sensor_id: SensorId) -> Result<(), HubError> {
        self.sensors.get_sensor(ctx, sensor_id).await.map(|_| ())
    }

    async fn latest_event(&self, ctx: &Context, sensor_id: SensorId) -> Result<Event, HubError> {
        self.events.last_event(ctx, sensor_id).await
    }
}

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Streaming,
    Closed,
}

/// Why a session stopped.
#[derive(Debug)]
pub enum SessionEnd {
    /// The remote peer closed the connection.
    PeerClosed,
    /// Delivering a reading to the client failed.
    PushFailed(Box<dyn std::error::Error + Send + Sync>),
    /// The shutdown signal fired.
    Shutdown,
}

/// Outcome of [`LiveStream::run`].
#[derive(Debug)]
pub struct SessionSummary {
    pub end: SessionEnd,
    /// Always [`SessionState::Closed`] once `run` returns.
    pub state: SessionState,
    /// Number of readings delivered.
    pub pushed: usize,
}

enum Step {
    Shutdown,
    PeerClosed,
    Tick,
}

/// One client's live feed for one sensor.
pub struct LiveStream<S> {
    source: S,
    ctx: Context,
    sensor_id: SensorId,
    period: Duration,
    state: SessionState,
    last_pushed: Option<Timestamp>,
}

impl<S: StreamSource + Send + Sync> LiveStream<S> {
    /// Open a session after confirming the sensor exists.
    ///
    /// The context's token is the session's shutdown signal; it should carry
    /// no deadline since the session is long-lived.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::NotFound`] when the sensor is unknown, or the
    /// lookup failure; no stream resources are acquired in that case.
    pub async fn connect(
        source: S,
        ctx: Context,
        sensor_id: SensorId,
        period: Duration,
    ) -> Result<Self, HubError> {
        let mut session = Self {
            source,
            ctx,
            sensor_id,
            period,
            state: SessionState::Connecting,
            last_pushed: None,
        };
        session
            .source
            .sensor_exists(&session.ctx, sensor_id)
            .await?;
        session.state = SessionState::Streaming;
        tracing::info!(sensor_id = %sensor_id, "live stream opened");
        Ok(session)
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Poll on a fixed cadence and push each new reading to `sink`.
    ///
    /// Lookup failures skip the tick. A reading whose timestamp equals the
    /// last one pushed is skipped. Once shutdown is observed nothing more is
    /// pushed, even if a lookup was in flight.
    pub async fn run<K>(mut self, sink: &mut K) -> SessionSummary
    where
        K: EventSink + Send,
    {
        let mut ticker = tokio::time::interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let shutdown = self.ctx.token().clone();
        let mut pushed = 0;

        let end = loop {
            let step = tokio::select! {
                biased;
                () = shutdown.cancelled() => Step::Shutdown,
                () = sink.closed() => Step::PeerClosed,
                _ = ticker.tick() => Step::Tick,
            };
            match step {
                Step::Shutdown => break SessionEnd::Shutdown,
                Step::PeerClosed => break SessionEnd::PeerClosed,
                Step::Tick => {}
            }

            let event = match self.source.latest_event(&self.ctx, self.sensor_id).await {
                Ok(event) => event,
                Err(err) => {
                    tracing::debug!(sensor_id = %self.sensor_id, error = %err, "skipping tick");
                    continue;
                }
            };
            if shutdown.is_cancelled() {
                break SessionEnd::Shutdown;
            }
            if self.last_pushed == Some(event.timestamp) {
                continue;
            }
            if let Err(err) = sink.push(&event).await {
                break SessionEnd::PushFailed(Box::new(err));
            }
            self.last_pushed = Some(event.timestamp);
            pushed += 1;
        };

        self.state = SessionState::Closed;
        tracing::info!(sensor_id = %self.sensor_id, state = ?self.state, pushed, end = ?end, "live stream closed");
        SessionSummary {
            end,
            state: self.state,
            pushed,
        }
    }
}

/// Owns the shutdown signal for every live session and tracks them.
#[derive(Debug, Clone, Default)]
pub struct StreamSupervisor {
    token: CancellationToken,
    tracker: TaskTracker,
}

impl StreamSupervisor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A context for a new session: cancelled with the supervisor, no deadline.
    #[must_use]
    pub fn session_context(&self) -> Context {
        Context::from_token(self.token.child_token())
    }

    /// The supervisor's shutdown token.
    #[must_use]
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Track a session future so [`shutdown`](Self::shutdown) waits for it.
    pub fn track<F: Future>(&self, future: F) -> impl Future<Output = F::Output> + use<F> {
        self.tracker.track_future(future)
    }

    /// Number of sessions still running.
    #[must_use]
    pub fn active(&self) -> usize {
        self.tracker.len()
    }

    /// Cancel every session and wait at most `grace` for them to finish.
    ///
    /// Returns `true` if all sessions finished in time. Calling it again is
    /// harmless.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        self.token.cancel();
        self.tracker.close();
        let drained = tokio::time::timeout(grace, self.tracker.wait()).await.is_ok();
        if drained {
            tracing::info!("all live streams closed");
        } else {
            tracing::warn!(remaining = self.active(), "live streams still running after grace period");
        }
        drained
    }
}
