//! # sensorhub-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a **JSON API** for sensors, events and users
//!   (`/sensors`, `/events`, `/users/{id}/sensors`, …)
//! - Serve the per-sensor **live stream** over WebSocket at
//!   `/sensors/{id}/events`
//! - Record request metrics in an explicit [`HttpMetrics`](metrics::HttpMetrics)
//!   collector and expose them at `/metrics`
//! - Map use-case errors onto HTTP status codes
//!
//! ## Dependency rule
//! Depends on `sensorhub-app` (for port traits and services) and `sensorhub-domain`
//! (for domain types used in request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod error;
pub mod metrics;
pub mod router;
pub mod state;
