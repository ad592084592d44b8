//! Repository for the `logs` table.

use encore_core::activity::LogStatus;

use crate::error::StoreError;
use crate::models::activity_log::ActivityLog;
use crate::models::decode_all;
use crate::query::{Entity, Query};
use crate::store::DataStore;

pub struct ActivityLogRepo;

impl ActivityLogRepo {
    /// Approved logs belonging to `user_id`.
    pub async fn list_approved_for_user(
        store: &dyn DataStore,
        user_id: &str,
    ) -> Result<Vec<ActivityLog>, StoreError> {
        let query = Query::new(Entity::ActivityLogs)
            .eq("userId", user_id)
            .eq("status", LogStatus::Approved.as_str());
        let rows = store.fetch_where(&query).await?;
        decode_all(Entity::ActivityLogs, rows)
    }
}
