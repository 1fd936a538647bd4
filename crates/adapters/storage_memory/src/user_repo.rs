//! In-memory implementation of [`UserRepository`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::RwLock;

use sensorhub_app::Context;
use sensorhub_app::ports::UserRepository;
use sensorhub_domain::error::{HubError, NotFoundError};
use sensorhub_domain::id::UserId;
use sensorhub_domain::user::User;

#[derive(Debug, Default)]
struct Table {
    next_id: i64,
    by_id: HashMap<UserId, User>,
}

/// User store with sequential ids.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    table: Arc<RwLock<Table>>,
}

impl InMemoryUserRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserRepository for InMemoryUserRepository {
    fn save(&self, ctx: &Context, mut user: User) -> impl Future<Output = Result<User, HubError>> + Send {
        let ctx = ctx.clone();
        let table = Arc::clone(&self.table);
        async move {
            ctx.check()?;
            let mut table = table.write().await;
            let id = match user.id {
                Some(id) => id,
                None => {
                    table.next_id += 1;
                    UserId::new(table.next_id)
                }
            };
            user.id = Some(id);
            table.by_id.insert(id, user.clone());
            Ok(user)
        }
    }

    fn get_by_id(
        &self,
        ctx: &Context,
        id: UserId,
    ) -> impl Future<Output = Result<User, HubError>> + Send {
        let ctx = ctx.clone();
        let table = Arc::clone(&self.table);
        async move {
            ctx.check()?;
            table
                .read()
                .await
                .by_id
                .get(&id)
                .cloned()
                .ok_or_else(|| NotFoundError::user(id).into())
        }
    }
}
