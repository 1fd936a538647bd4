//! Request metrics, held in an explicit collector rather than a global registry.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{MatchedPath, Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

use sensorhub_app::ports::{
    EventRepository, SensorOwnerRepository, SensorRepository, UserRepository,
};

use crate::state::AppState;

const UNMATCHED_ROUTE: &str = "unmatched";

/// HTTP request counters and latency histogram with their own registry.
pub struct HttpMetrics {
    registry: Registry,
    requests: IntCounterVec,
    errors: IntCounterVec,
    duration: HistogramVec,
    statuses: IntCounterVec,
}

impl HttpMetrics {
    /// Build the collectors and register them in a fresh registry.
    ///
    /// # Errors
    ///
    /// Returns an error if a collector cannot be created or registered.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let requests = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &["method", "endpoint"],
        )?;
        let errors = IntCounterVec::new(
            Opts::new(
                "http_request_errors_total",
                "Total number of HTTP requests answered with an error status",
            ),
            &["method", "endpoint"],
        )?;
        let duration = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "Duration of HTTP requests in seconds",
            ),
            &["method", "endpoint"],
        )?;
        let statuses = IntCounterVec::new(
            Opts::new(
                "http_response_status_codes_total",
                "Total number of HTTP response status codes",
            ),
            &["status_code", "method", "endpoint"],
        )?;

        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(errors.clone()))?;
        registry.register(Box::new(duration.clone()))?;
        registry.register(Box::new(statuses.clone()))?;

        Ok(Self {
            registry,
            requests,
            errors,
            duration,
            statuses,
        })
    }

    /// Record one finished request.
    pub fn record(&self, method: &str, endpoint: &str, status: StatusCode, elapsed: Duration) {
        self.requests.with_label_values(&[method, endpoint]).inc();
        self.duration
            .with_label_values(&[method, endpoint])
            .observe(elapsed.as_secs_f64());
        self.statuses
            .with_label_values(&[status.as_str(), method, endpoint])
            .inc();
        if status.is_client_error() || status.is_server_error() {
            self.errors.with_label_values(&[method, endpoint]).inc();
        }
    }

    /// Render every collector in the Prometheus text format.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn encode(&self) -> Result<Vec<u8>, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(buffer)
    }
}

/// Middleware recording every request against its matched route.
pub async fn track(
    State(metrics): State<Arc<HttpMetrics>>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().as_str().to_owned();
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| UNMATCHED_ROUTE.to_owned(), |path| path.as_str().to_owned());

    let start = Instant::now();
    let response = next.run(request).await;
    metrics.record(&method, &endpoint, response.status(), start.elapsed());
    response
}

/// `GET /metrics`
pub async fn expose<SR, ER, UR, OR>(State(state): State<AppState<SR, ER, UR, OR>>) -> Response
where
    SR: SensorRepository + Send + Sync + 'static,
    ER: EventRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    OR: SensorOwnerRepository + Send + Sync + 'static,
{
    match state.metrics.encode() {
        Ok(body) => (
            [(header::CONTENT_TYPE, TextEncoder::new().format_type().to_owned())],
            body,
        )
            .into_response(),
        Err(err) => {
            tracing::error!(error = %err, "unable to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_count_requests_and_errors_per_route() {
        let metrics = HttpMetrics::new().unwrap();
        metrics.record("GET", "/sensors", StatusCode::OK, Duration::from_millis(3));
        metrics.record("GET", "/sensors/{id}", StatusCode::NOT_FOUND, Duration::from_millis(1));

        let text = String::from_utf8(metrics.encode().unwrap()).unwrap();
        assert!(text.contains(r#"http_requests_total{endpoint="/sensors",method="GET"} 1"#));
        assert!(text.contains(r#"http_request_errors_total{endpoint="/sensors/{id}",method="GET"} 1"#));
        assert!(text.contains(
            r#"http_response_status_codes_total{endpoint="/sensors/{id}",method="GET",status_code="404"} 1"#
        ));
        assert!(!text.contains(r#"http_request_errors_total{endpoint="/sensors",method="GET"}"#));
    }

    #[test]
    fn should_keep_collectors_apart_between_instances() {
        let first = HttpMetrics::new().unwrap();
        let second = HttpMetrics::new().unwrap();
        first.record("POST", "/events", StatusCode::CREATED, Duration::ZERO);

        let text = String::from_utf8(second.encode().unwrap()).unwrap();
        assert!(!text.contains("/events"));
    }
}
