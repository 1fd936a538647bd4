//! # sensorhub-adapter-storage-memory
//!
//! In-memory persistence adapter.
//!
//! ## Responsibilities
//! - Implement the repository port traits defined in `sensorhub-app::ports::storage`
//! - Assign store-side identities (`SensorId`, `UserId`) and registration times
//! - Keep one sensor record per serial number under racing inserts
//!
//! ## Dependency rule
//! Depends on `sensorhub-app` (for port traits) and `sensorhub-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.
//!
//! Every repository is a cheap handle over shared state: cloning it yields
//! another view of the same store.

mod event_repo;
mod owner_repo;
mod sensor_repo;
mod user_repo;

pub use event_repo::InMemoryEventRepository;
pub use owner_repo::InMemorySensorOwnerRepository;
pub use sensor_repo::InMemorySensorRepository;
pub use user_repo::InMemoryUserRepository;
