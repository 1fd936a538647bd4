//! Axum router assembly.

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use sensorhub_app::ports::{
    EventRepository, SensorOwnerRepository, SensorRepository, UserRepository,
};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Every route is recorded by the metrics middleware and wrapped in a
/// [`TraceLayer`] that logs each HTTP request/response at the `DEBUG` level.
pub fn build<SR, ER, UR, OR>(state: AppState<SR, ER, UR, OR>) -> Router
where
    SR: SensorRepository + Send + Sync + 'static,
    ER: EventRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    OR: SensorOwnerRepository + Send + Sync + 'static,
{
    let metrics = Arc::clone(&state.metrics);
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(crate::metrics::expose::<SR, ER, UR, OR>))
        .merge(crate::api::routes())
        .layer(middleware::from_fn_with_state(metrics, crate::metrics::track))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use sensorhub_adapter_storage_memory::{
        InMemoryEventRepository, InMemorySensorOwnerRepository, InMemorySensorRepository,
        InMemoryUserRepository,
    };
    use sensorhub_app::live_stream::StreamSupervisor;
    use sensorhub_app::services::event_service::EventService;
    use sensorhub_app::services::sensor_service::SensorService;
    use sensorhub_app::services::user_service::UserService;

    use super::*;
    use crate::metrics::HttpMetrics;

    type TestState = AppState<
        InMemorySensorRepository,
        InMemoryEventRepository,
        InMemoryUserRepository,
        InMemorySensorOwnerRepository,
    >;

    fn test_state() -> TestState {
        let sensors = InMemorySensorRepository::new();
        AppState::new(
            SensorService::new(sensors.clone()),
            EventService::new(InMemoryEventRepository::new(), sensors.clone()),
            UserService::new(
                InMemoryUserRepository::new(),
                InMemorySensorOwnerRepository::new(),
                sensors,
            ),
            StreamSupervisor::new(),
            HttpMetrics::new().unwrap(),
        )
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn sensor_body(serial: &str) -> Value {
        json!({
            "type": "cc",
            "serial_number": serial,
            "description": "garage door",
            "is_active": true,
        })
    }

    #[tokio::test]
    async fn should_return_ok_when_health_check_called() {
        let app = build(test_state());

        let response = app.oneshot(get_request("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn should_register_sensor_once_per_serial_number() {
        let app = build(test_state());

        let (status, first) = send(&app, post_json("/sensors", &sensor_body("0123456789"))).await;
        assert_eq!(status, StatusCode::OK);
        let (status, second) = send(&app, post_json("/sensors", &sensor_body("0123456789"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["id"], second["id"]);

        let (status, list) = send(&app, get_request("/sensors")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn should_reject_unknown_sensor_type_with_422() {
        let app = build(test_state());
        let mut body = sensor_body("0123456789");
        body["type"] = json!("thermo");

        let (status, body) = send(&app, post_json("/sensors", &body)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["reason"].as_str().unwrap().contains("sensor type"));
    }

    #[tokio::test]
    async fn should_reject_malformed_json_with_400() {
        let app = build(test_state());
        let request = Request::builder()
            .method("POST")
            .uri("/sensors")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let (status, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["reason"].is_string());
    }

    #[tokio::test]
    async fn should_answer_404_for_unknown_sensor_and_422_for_bad_id() {
        let app = build(test_state());

        let (status, _) = send(&app, get_request("/sensors/42")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, get_request("/sensors/zero")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let (status, _) = send(&app, get_request("/sensors/0")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn should_ingest_event_and_update_sensor_state() {
        let app = build(test_state());
        let (_, sensor) = send(&app, post_json("/sensors", &sensor_body("0123456789"))).await;
        let id = sensor["id"].as_i64().unwrap();

        let (status, event) = send(
            &app,
            post_json(
                "/events",
                &json!({ "sensor_serial_number": "0123456789", "payload": 7 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(event["sensor_id"], json!(id));
        assert!(event["timestamp"].is_string());

        let (_, sensor) = send(&app, get_request(&format!("/sensors/{id}"))).await;
        assert_eq!(sensor["current_state"], json!(7));
        assert!(sensor["last_activity"].is_string());
    }

    #[tokio::test]
    async fn should_answer_404_for_event_from_unknown_sensor() {
        let app = build(test_state());
        let (status, _) = send(
            &app,
            post_json(
                "/events",
                &json!({ "sensor_serial_number": "0123456789", "payload": 1 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn should_return_history_sorted_within_inclusive_bounds() {
        let app = build(test_state());
        let (_, sensor) = send(&app, post_json("/sensors", &sensor_body("0123456789"))).await;
        let id = sensor["id"].as_i64().unwrap();
        for (payload, timestamp) in [
            (3, "2024-01-01T00:00:30Z"),
            (1, "2024-01-01T00:00:10Z"),
            (2, "2024-01-01T00:00:20Z"),
            (4, "2024-01-01T00:00:40Z"),
        ] {
            let (status, _) = send(
                &app,
                post_json(
                    "/events",
                    &json!({
                        "sensor_serial_number": "0123456789",
                        "payload": payload,
                        "timestamp": timestamp,
                    }),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, history) = send(
            &app,
            get_request(&format!(
                "/sensors/{id}/history?start_date=2024-01-01T00:00:10Z&end_date=2024-01-01T00:00:30Z"
            )),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let payloads: Vec<i64> = history
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["payload"].as_i64().unwrap())
            .collect();
        assert_eq!(payloads, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn should_reject_history_without_bounds() {
        let app = build(test_state());
        let (status, _) = send(&app, get_request("/sensors/1/history?start_date=2024-01-01T00:00:10Z")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let (status, _) = send(&app, get_request("/sensors/1/history?start_date=yesterday&end_date=today")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn should_manage_users_and_ownership() {
        let app = build(test_state());
        let (_, sensor) = send(&app, post_json("/sensors", &sensor_body("0123456789"))).await;
        let sensor_id = sensor["id"].as_i64().unwrap();

        let (status, user) = send(&app, post_json("/users", &json!({ "name": "Ada" }))).await;
        assert_eq!(status, StatusCode::OK);
        let user_id = user["id"].as_i64().unwrap();

        let uri = format!("/users/{user_id}/sensors");
        let (status, _) = send(&app, post_json(&uri, &json!({ "sensor_id": sensor_id }))).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = send(&app, post_json(&uri, &json!({ "sensor_id": 99 }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, owned) = send(&app, get_request(&uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(owned[0]["serial_number"], json!("0123456789"));
        assert_eq!(owned.as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn should_reject_empty_user_name_with_422() {
        let app = build(test_state());
        let (status, _) = send(&app, post_json("/users", &json!({ "name": "" }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn should_check_sensor_before_websocket_upgrade() {
        let app = build(test_state());

        let (status, _) = send(&app, get_request("/sensors/5/events")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        send(&app, post_json("/sensors", &sensor_body("0123456789"))).await;
        let (status, _) = send(&app, get_request("/sensors/1/events")).await;
        assert_ne!(status, StatusCode::NOT_FOUND);
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn should_list_allowed_methods_when_options_requested() {
        let app = build(test_state());

        for (uri, allowed) in [
            ("/sensors", "POST, OPTIONS, GET, HEAD"),
            ("/sensors/1/history", "OPTIONS, GET, HEAD"),
            ("/events", "POST, OPTIONS"),
        ] {
            let request = Request::builder()
                .method("OPTIONS")
                .uri(uri)
                .body(Body::empty())
                .unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::NO_CONTENT);
            assert_eq!(response.headers()[header::ALLOW], allowed);
        }
    }

    #[tokio::test]
    async fn should_answer_406_when_client_refuses_json() {
        let app = build(test_state());
        let read = |accept: &str| {
            Request::builder()
                .uri("/sensors")
                .header(header::ACCEPT, accept)
                .body(Body::empty())
                .unwrap()
        };

        let (status, body) = send(&app, read("application/xml")).await;
        assert_eq!(status, StatusCode::NOT_ACCEPTABLE);
        assert_eq!(body["reason"], "Content type is not application/json");

        let (status, _) = send(&app, read("application/json")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn should_not_check_accept_when_writing() {
        let app = build(test_state());
        let request = Request::builder()
            .method("POST")
            .uri("/users")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/xml")
            .body(Body::from(json!({ "name": "Ada" }).to_string()))
            .unwrap();

        let (status, _) = send(&app, request).await;

        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn should_expose_request_metrics() {
        let app = build(test_state());
        send(&app, get_request("/sensors")).await;
        send(&app, get_request("/sensors/42")).await;

        let response = app.oneshot(get_request("/metrics")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains(r#"http_requests_total{endpoint="/sensors",method="GET"} 1"#));
        assert!(text.contains(r#"http_request_errors_total{endpoint="/sensors/{id}",method="GET"} 1"#));
    }
}
