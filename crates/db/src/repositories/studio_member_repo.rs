//! Repository for the `studio_members` table.

use crate::error::StoreError;
use crate::models::decode_all;
use crate::models::studio_member::StudioMembership;
use crate::query::{Entity, Query};
use crate::store::DataStore;

pub struct StudioMemberRepo;

impl StudioMemberRepo {
    /// Every studio the user belongs to.
    pub async fn list_for_user(
        store: &dyn DataStore,
        user_id: &str,
    ) -> Result<Vec<StudioMembership>, StoreError> {
        let rows = store
            .fetch_where(&Query::new(Entity::StudioMembers).eq("user_id", user_id))
            .await?;
        decode_all(Entity::StudioMembers, rows)
    }

    /// The user's membership in one studio, if any.
    pub async fn find(
        store: &dyn DataStore,
        user_id: &str,
        studio_id: &str,
    ) -> Result<Option<StudioMembership>, StoreError> {
        let query = Query::new(Entity::StudioMembers)
            .eq("user_id", user_id)
            .eq("studio_id", studio_id);
        let rows = store.fetch_where(&query).await?;
        Ok(decode_all::<StudioMembership>(Entity::StudioMembers, rows)?
            .into_iter()
            .next())
    }
}
