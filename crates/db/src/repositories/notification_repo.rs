//! Repository for the `notifications` table.

use crate::error::StoreError;
use crate::models::notification::NewNotification;
use crate::query::Entity;
use crate::store::DataStore;

pub struct NotificationRepo;

impl NotificationRepo {
    pub async fn create(store: &dyn DataStore, input: &NewNotification) -> Result<(), StoreError> {
        store
            .insert(Entity::Notifications, vec![input.to_row()])
            .await
    }
}
