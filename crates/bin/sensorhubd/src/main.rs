//! # sensorhubd — sensorhub daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialize structured logging
//! - Construct repository implementations (adapters)
//! - Construct application services, injecting repositories via port traits
//! - Build the axum router, injecting application services
//! - Bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT), draining live streams
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use sensorhub_adapter_http_axum::metrics::HttpMetrics;
use sensorhub_adapter_http_axum::state::AppState;
use sensorhub_adapter_storage_memory::{
    InMemoryEventRepository, InMemorySensorOwnerRepository, InMemorySensorRepository,
    InMemoryUserRepository,
};
use sensorhub_app::live_stream::StreamSupervisor;
use sensorhub_app::services::event_service::EventService;
use sensorhub_app::services::sensor_service::SensorService;
use sensorhub_app::services::user_service::UserService;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.logging.filter))
        .init();

    // Repositories
    let sensor_repo = InMemorySensorRepository::new();
    let event_repo = InMemoryEventRepository::new();
    let user_repo = InMemoryUserRepository::new();
    let owner_repo = InMemorySensorOwnerRepository::new();

    // Services
    let sensor_service = SensorService::new(sensor_repo.clone());
    let event_service = EventService::new(event_repo, sensor_repo.clone());
    let user_service = UserService::new(user_repo, owner_repo, sensor_repo);
    let supervisor = StreamSupervisor::new();

    // HTTP
    let state = AppState::new(
        sensor_service,
        event_service,
        user_service,
        supervisor.clone(),
        HttpMetrics::new()?,
    )
    .with_stream_interval(config.stream_interval())
    .with_request_timeout(config.request_timeout());
    let app = sensorhub_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "sensorhubd listening");

    let token = supervisor.token().clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            token.cancel();
        })
        .await?;

    supervisor.shutdown(config.shutdown_grace()).await;
    tracing::info!("sensorhubd stopped");

    Ok(())
}

/// Resolve on SIGINT or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "unable to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "unable to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
