//! JSON handlers for users and sensor ownership.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use sensorhub_app::ports::{
    EventRepository, SensorOwnerRepository, SensorRepository, UserRepository,
};
use sensorhub_domain::id::{SensorId, UserId};
use sensorhub_domain::sensor::Sensor;
use sensorhub_domain::user::User;

use crate::api::parse_id;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for creating a user.
#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
}

/// Request body for linking a sensor to a user.
#[derive(Deserialize)]
pub struct AttachSensorRequest {
    pub sensor_id: i64,
}

/// Possible responses from the register endpoint.
pub enum RegisterResponse {
    Ok(Json<User>),
}

impl IntoResponse for RegisterResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the attach endpoint.
pub enum AttachResponse {
    Created,
}

impl IntoResponse for AttachResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created => StatusCode::CREATED.into_response(),
        }
    }
}

/// Possible responses from the owned-sensors endpoint.
pub enum SensorsResponse {
    Ok(Json<Vec<Sensor>>),
}

impl IntoResponse for SensorsResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `POST /users`
pub async fn register<SR, ER, UR, OR>(
    State(state): State<AppState<SR, ER, UR, OR>>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<RegisterResponse, ApiError>
where
    SR: SensorRepository + Send + Sync + 'static,
    ER: EventRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    OR: SensorOwnerRepository + Send + Sync + 'static,
{
    let Json(req) = payload?;
    let ctx = state.request_context();
    let user = state
        .user_service
        .register_user(&ctx, User::new(req.name))
        .await?;
    Ok(RegisterResponse::Ok(Json(user)))
}

/// `POST /users/{id}/sensors`
pub async fn attach<SR, ER, UR, OR>(
    State(state): State<AppState<SR, ER, UR, OR>>,
    Path(id): Path<String>,
    payload: Result<Json<AttachSensorRequest>, JsonRejection>,
) -> Result<AttachResponse, ApiError>
where
    SR: SensorRepository + Send + Sync + 'static,
    ER: EventRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    OR: SensorOwnerRepository + Send + Sync + 'static,
{
    let user_id: UserId = parse_id(&id)?;
    let Json(req) = payload?;
    let sensor_id: SensorId = parse_id(&req.sensor_id.to_string())?;

    let ctx = state.request_context();
    state
        .user_service
        .attach_sensor_to_user(&ctx, user_id, sensor_id)
        .await?;
    Ok(AttachResponse::Created)
}

/// `GET /users/{id}/sensors`
pub async fn sensors<SR, ER, UR, OR>(
    State(state): State<AppState<SR, ER, UR, OR>>,
    Path(id): Path<String>,
) -> Result<SensorsResponse, ApiError>
where
    SR: SensorRepository + Send + Sync + 'static,
    ER: EventRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    OR: SensorOwnerRepository + Send + Sync + 'static,
{
    let user_id: UserId = parse_id(&id)?;
    let ctx = state.request_context();
    let sensors = state.user_service.user_sensors(&ctx, user_id).await?;
    Ok(SensorsResponse::Ok(Json(sensors)))
}
