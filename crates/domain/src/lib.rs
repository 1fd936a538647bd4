//! # sensorhub-domain
//!
//! Pure domain model for the sensorhub event-ingestion service.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Sensors** (physical devices identified by a serial number, with a
//!   denormalized last-known reading)
//! - Define **Events** (timestamped readings, immutable once stored)
//! - Define **Users** and **sensor ownership** links
//! - Contain all input validation rules (sensor type, serial number, event
//!   timestamp, user name)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod event;
pub mod sensor;
pub mod user;
