//! JSON API and live-stream handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod events;
#[allow(clippy::missing_errors_doc)]
pub mod sensors;
pub mod stream;
#[allow(clippy::missing_errors_doc)]
pub mod users;

use axum::Router;
use axum::extract::Request;
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{MethodRouter, get, options, post};

use sensorhub_app::ports::{
    EventRepository, SensorOwnerRepository, SensorRepository, UserRepository,
};
use sensorhub_domain::error::ValidationError;

use crate::error::ApiError;
use crate::state::AppState;

/// Build the API router.
///
/// Every JSON route answers `OPTIONS` with its `Allow` list, and reads
/// (`GET`/`HEAD`) are refused with 406 unless the client accepts JSON.
/// The live stream sits outside the JSON check.
pub fn routes<SR, ER, UR, OR>() -> Router<AppState<SR, ER, UR, OR>>
where
    SR: SensorRepository + Send + Sync + 'static,
    ER: EventRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    OR: SensorOwnerRepository + Send + Sync + 'static,
{
    Router::new()
        // Sensors
        .route(
            "/sensors",
            get(sensors::list::<SR, ER, UR, OR>)
                .post(sensors::register::<SR, ER, UR, OR>)
                .merge(allow("POST, OPTIONS, GET, HEAD")),
        )
        .route(
            "/sensors/{id}",
            get(sensors::get::<SR, ER, UR, OR>).merge(allow("OPTIONS, GET, HEAD")),
        )
        .route(
            "/sensors/{id}/history",
            get(sensors::history::<SR, ER, UR, OR>).merge(allow("OPTIONS, GET, HEAD")),
        )
        // Events
        .route(
            "/events",
            post(events::receive::<SR, ER, UR, OR>).merge(allow("POST, OPTIONS")),
        )
        // Users
        .route(
            "/users",
            post(users::register::<SR, ER, UR, OR>).merge(allow("POST, OPTIONS")),
        )
        .route(
            "/users/{id}/sensors",
            get(users::sensors::<SR, ER, UR, OR>)
                .post(users::attach::<SR, ER, UR, OR>)
                .merge(allow("POST, OPTIONS, GET, HEAD")),
        )
        .route_layer(middleware::from_fn(accept_json))
        .route("/sensors/{id}/events", get(stream::open::<SR, ER, UR, OR>))
}

/// `OPTIONS` handler listing the methods a path supports.
fn allow<S>(methods: &'static str) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    options(move || async move { (StatusCode::NO_CONTENT, [(header::ALLOW, methods)]) })
}

/// Refuse reads whose `Accept` header rules out JSON.
async fn accept_json(request: Request, next: Next) -> Response {
    if matches!(*request.method(), Method::GET | Method::HEAD) && !accepts_json(request.headers())
    {
        return ApiError::Rejected(
            StatusCode::NOT_ACCEPTABLE,
            "Content type is not application/json".to_owned(),
        )
        .into_response();
    }
    next.run(request).await
}

/// A missing `Accept` header accepts anything.
fn accepts_json(headers: &HeaderMap) -> bool {
    let mut values = headers.get_all(header::ACCEPT).iter().peekable();
    if values.peek().is_none() {
        return true;
    }
    values
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(|range| range.split(';').next().unwrap_or_default().trim())
        .any(|media| {
            media == "*/*"
                || media.eq_ignore_ascii_case("application/*")
                || media.eq_ignore_ascii_case("application/json")
        })
}

/// Parse a store-assigned id; ids start at 1.
pub(crate) fn parse_id<T: From<i64>>(raw: &str) -> Result<T, ApiError> {
    match raw.parse::<i64>() {
        Ok(value) if value >= 1 => Ok(T::from(value)),
        _ => Err(ValidationError::InvalidIdentifier(raw.to_owned()).into()),
    }
}
