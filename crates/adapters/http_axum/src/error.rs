//! HTTP error response mapping.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use sensorhub_domain::error::{HubError, ValidationError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    reason: String,
}

/// Maps [`HubError`] and extractor rejections to an HTTP response.
pub enum ApiError {
    Hub(HubError),
    /// The request could not be decoded.
    Rejected(StatusCode, String),
}

impl From<HubError> for ApiError {
    fn from(err: HubError) -> Self {
        Self::Hub(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::Hub(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Rejected(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(_: QueryRejection) -> Self {
        ValidationError::InvalidTimeFrame.into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, reason) = match self {
            Self::Rejected(status, reason) => (status, reason),
            Self::Hub(HubError::Validation(err)) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
            Self::Hub(HubError::NotFound(err)) => (StatusCode::NOT_FOUND, err.to_string()),
            Self::Hub(err) => {
                tracing::error!(error = %err, source = ?std::error::Error::source(&err), "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { reason })).into_response()
    }
}
