//! Repository for the `users` table.

use crate::error::StoreError;
use crate::models::decode_all;
use crate::models::user::{PointsUpdate, User};
use crate::query::{Entity, Query};
use crate::store::DataStore;

pub struct UserRepo;

impl UserRepo {
    /// Find a user by id. Unknown ids yield `None`.
    pub async fn find_by_id(store: &dyn DataStore, id: &str) -> Result<Option<User>, StoreError> {
        let rows = store
            .fetch_where(&Query::new(Entity::Users).eq("id", id))
            .await?;
        Ok(decode_all::<User>(Entity::Users, rows)?.into_iter().next())
    }

    /// Write the cached points total and level id.
    pub async fn set_points(
        store: &dyn DataStore,
        id: &str,
        update: PointsUpdate,
    ) -> Result<(), StoreError> {
        store.update(Entity::Users, id, update.to_row()).await
    }
}
