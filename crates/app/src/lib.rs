//! # sensorhub-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `SensorRepository` — save, list, lookup by id and by serial number
//!   - `EventRepository` — append, last-by-sensor, time-range query
//!   - `UserRepository` — save, lookup by id
//!   - `SensorOwnerRepository` — link users to sensors
//! - Define **driving/inbound ports** as use-case structs:
//!   - `SensorService` — idempotent registration, list, get
//!   - `EventService` — ingest a reading and update the sensor's live state
//!   - `UserService` — register users, bind sensors to users
//!   - `LiveStream` — per-client polling session pushing new readings
//! - Carry caller cancellation (`Context`) into every operation
//!
//! ## Dependency rule
//! Depends on `sensorhub-domain` only (plus `tokio`/`tokio-util` for timers
//! and cancellation). Never imports adapter crates. Adapters depend on *this*
//! crate, not the reverse.

pub mod context;
pub mod live_stream;
pub mod ports;
pub mod services;

pub use context::Context;

#[cfg(test)]
pub(crate) mod fakes;
