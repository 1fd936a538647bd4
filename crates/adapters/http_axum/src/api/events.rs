//! JSON handler for event ingestion.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use sensorhub_app::ports::{
    EventRepository, SensorOwnerRepository, SensorRepository, UserRepository,
};
use sensorhub_domain::event::{Event, IncomingEvent};
use sensorhub_domain::time::now;

use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the ingestion endpoint.
pub enum ReceiveResponse {
    Created(Json<Event>),
}

impl IntoResponse for ReceiveResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// `POST /events`
///
/// Readings submitted without a timestamp are stamped with the receive time.
pub async fn receive<SR, ER, UR, OR>(
    State(state): State<AppState<SR, ER, UR, OR>>,
    payload: Result<Json<IncomingEvent>, JsonRejection>,
) -> Result<ReceiveResponse, ApiError>
where
    SR: SensorRepository + Send + Sync + 'static,
    ER: EventRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    OR: SensorOwnerRepository + Send + Sync + 'static,
{
    let Json(mut incoming) = payload?;
    incoming.timestamp.get_or_insert_with(now);

    let ctx = state.request_context();
    let event = state.event_service.receive_event(&ctx, incoming).await?;
    Ok(ReceiveResponse::Created(Json(event)))
}
