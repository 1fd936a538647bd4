//! WebSocket live stream of a sensor's readings.

use axum::extract::ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code};
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};

use sensorhub_app::live_stream::{EventSink, LiveStream, SessionEnd, StreamSource};
use sensorhub_app::ports::{
    EventRepository, SensorOwnerRepository, SensorRepository, UserRepository,
};
use sensorhub_domain::event::{Event, SensorStatus};
use sensorhub_domain::id::SensorId;

use crate::api::parse_id;
use crate::error::ApiError;
use crate::state::AppState;

/// Failure to deliver a reading over the socket.
#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error("unable to encode reading")]
    Encode(#[from] serde_json::Error),
    #[error("unable to send frame")]
    Send(#[from] axum::Error),
}

/// [`EventSink`] writing one JSON text frame per reading.
pub struct WebSocketSink {
    socket: WebSocket,
}

impl EventSink for WebSocketSink {
    type Error = PushError;

    async fn push(&mut self, event: &Event) -> Result<(), PushError> {
        let body = serde_json::to_string(&SensorStatus::from(event))?;
        self.socket.send(Message::Text(body.into())).await?;
        Ok(())
    }

    async fn closed(&mut self) {
        loop {
            match self.socket.recv().await {
                None | Some(Err(_) | Ok(Message::Close(_))) => return,
                Some(Ok(_)) => {}
            }
        }
    }
}

/// `GET /sensors/{id}/events`
///
/// The sensor is looked up before the upgrade, so an unknown sensor is
/// answered with 404 rather than an open socket.
#[allow(clippy::missing_errors_doc)]
pub async fn open<SR, ER, UR, OR>(
    State(state): State<AppState<SR, ER, UR, OR>>,
    Path(id): Path<String>,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, ApiError>
where
    SR: SensorRepository + Send + Sync + 'static,
    ER: EventRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    OR: SensorOwnerRepository + Send + Sync + 'static,
{
    let sensor_id: SensorId = parse_id(&id)?;
    let session = LiveStream::connect(
        state.stream_source(),
        state.supervisor.session_context(),
        sensor_id,
        state.stream_interval,
    )
    .await?;
    tracing::debug!(sensor_id = %sensor_id, state = ?session.state(), "live stream connected");

    let upgrade = match upgrade {
        Ok(upgrade) => upgrade,
        Err(rejection) => return Ok(rejection.into_response()),
    };
    let supervisor = state.supervisor.clone();
    Ok(upgrade
        .on_upgrade(move |socket| supervisor.track(serve(session, socket)))
        .into_response())
}

async fn serve<S>(session: LiveStream<S>, socket: WebSocket)
where
    S: StreamSource + Send + Sync,
{
    let mut sink = WebSocketSink { socket };
    let summary = session.run(&mut sink).await;

    if let SessionEnd::Shutdown = summary.end {
        let frame = CloseFrame {
            code: close_code::AWAY,
            reason: Utf8Bytes::from_static("server shutting down"),
        };
        if let Err(err) = sink.socket.send(Message::Close(Some(frame))).await {
            tracing::debug!(error = %err, "unable to send close frame");
        }
    }
}
