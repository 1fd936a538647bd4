//! In-memory implementation of [`SensorOwnerRepository`].

use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::sync::Arc;

use tokio::sync::RwLock;

use sensorhub_app::Context;
use sensorhub_app::ports::SensorOwnerRepository;
use sensorhub_domain::error::HubError;
use sensorhub_domain::id::{SensorId, UserId};
use sensorhub_domain::user::SensorOwner;

/// Ownership links keyed by user. Linking the same pair twice is a no-op.
#[derive(Debug, Clone, Default)]
pub struct InMemorySensorOwnerRepository {
    links: Arc<RwLock<HashMap<UserId, BTreeSet<SensorId>>>>,
}

impl InMemorySensorOwnerRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SensorOwnerRepository for InMemorySensorOwnerRepository {
    fn save(
        &self,
        ctx: &Context,
        owner: SensorOwner,
    ) -> impl Future<Output = Result<(), HubError>> + Send {
        let ctx = ctx.clone();
        let links = Arc::clone(&self.links);
        async move {
            ctx.check()?;
            links
                .write()
                .await
                .entry(owner.user_id)
                .or_default()
                .insert(owner.sensor_id);
            Ok(())
        }
    }

    fn get_by_user_id(
        &self,
        ctx: &Context,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<SensorOwner>, HubError>> + Send {
        let ctx = ctx.clone();
        let links = Arc::clone(&self.links);
        async move {
            ctx.check()?;
            let links = links.read().await;
            Ok(links
                .get(&user_id)
                .into_iter()
                .flatten()
                .map(|&sensor_id| SensorOwner { user_id, sensor_id })
                .collect())
        }
    }
}
