//! JSON handlers for sensors.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use sensorhub_app::ports::{
    EventRepository, SensorOwnerRepository, SensorRepository, UserRepository,
};
use sensorhub_domain::error::ValidationError;
use sensorhub_domain::event::SensorStatus;
use sensorhub_domain::id::SensorId;
use sensorhub_domain::sensor::{Sensor, SensorRegistration};
use sensorhub_domain::time::Timestamp;

use crate::api::parse_id;
use crate::error::ApiError;
use crate::state::AppState;

/// Query string of the history endpoint. Both bounds are inclusive.
#[derive(Deserialize)]
pub struct TimeFrameQuery {
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Sensor>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get and register endpoints.
pub enum SensorResponse {
    Ok(Json<Sensor>),
}

impl IntoResponse for SensorResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the history endpoint.
pub enum HistoryResponse {
    Ok(Json<Vec<SensorStatus>>),
}

impl IntoResponse for HistoryResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `POST /sensors`
///
/// Answers 200 with the stored sensor whether it was just created or already
/// registered under the same serial number.
pub async fn register<SR, ER, UR, OR>(
    State(state): State<AppState<SR, ER, UR, OR>>,
    payload: Result<Json<SensorRegistration>, JsonRejection>,
) -> Result<SensorResponse, ApiError>
where
    SR: SensorRepository + Send + Sync + 'static,
    ER: EventRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    OR: SensorOwnerRepository + Send + Sync + 'static,
{
    let Json(registration) = payload?;
    let ctx = state.request_context();
    let sensor = state
        .sensor_service
        .register_sensor(&ctx, registration)
        .await?;
    Ok(SensorResponse::Ok(Json(sensor)))
}

/// `GET /sensors`
pub async fn list<SR, ER, UR, OR>(
    State(state): State<AppState<SR, ER, UR, OR>>,
) -> Result<ListResponse, ApiError>
where
    SR: SensorRepository + Send + Sync + 'static,
    ER: EventRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    OR: SensorOwnerRepository + Send + Sync + 'static,
{
    let ctx = state.request_context();
    let sensors = state.sensor_service.list_sensors(&ctx).await?;
    Ok(ListResponse::Ok(Json(sensors)))
}

/// `GET /sensors/{id}`
pub async fn get<SR, ER, UR, OR>(
    State(state): State<AppState<SR, ER, UR, OR>>,
    Path(id): Path<String>,
) -> Result<SensorResponse, ApiError>
where
    SR: SensorRepository + Send + Sync + 'static,
    ER: EventRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    OR: SensorOwnerRepository + Send + Sync + 'static,
{
    let sensor_id: SensorId = parse_id(&id)?;
    let ctx = state.request_context();
    let sensor = state.sensor_service.get_sensor(&ctx, sensor_id).await?;
    Ok(SensorResponse::Ok(Json(sensor)))
}

/// `GET /sensors/{id}/history?start_date=..&end_date=..`
///
/// Readings are returned oldest first.
pub async fn history<SR, ER, UR, OR>(
    State(state): State<AppState<SR, ER, UR, OR>>,
    Path(id): Path<String>,
    query: Result<Query<TimeFrameQuery>, QueryRejection>,
) -> Result<HistoryResponse, ApiError>
where
    SR: SensorRepository + Send + Sync + 'static,
    ER: EventRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    OR: SensorOwnerRepository + Send + Sync + 'static,
{
    let sensor_id: SensorId = parse_id(&id)?;
    let Query(query) = query?;
    let (Some(start), Some(end)) = (query.start_date, query.end_date) else {
        return Err(ValidationError::InvalidTimeFrame.into());
    };

    let ctx = state.request_context();
    let mut events = state
        .event_service
        .events_in_time_frame(&ctx, sensor_id, start, end)
        .await?;
    events.sort_by_key(|event| event.timestamp);
    let statuses = events.iter().map(SensorStatus::from).collect();
    Ok(HistoryResponse::Ok(Json(statuses)))
}
