//! Level-up notification writer.
//!
//! [`NotificationWriter`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! and inserts a `notifications` row for every `level.advanced` event. It
//! runs as a background task and exits when the bus is dropped.

use std::sync::Arc;

use encore_db::models::notification::NewNotification;
use encore_db::repositories::NotificationRepo;
use encore_db::{DataStore, StoreError};
use tokio::sync::broadcast;

use crate::bus::{StudioEvent, EVENT_LEVEL_ADVANCED};

pub struct NotificationWriter;

impl NotificationWriter {
    /// Run the writer loop until the channel closes.
    pub async fn run(store: Arc<dyn DataStore>, mut receiver: broadcast::Receiver<StudioEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) if event.event_type == EVENT_LEVEL_ADVANCED => {
                    if let Err(e) = Self::write(store.as_ref(), &event).await {
                        tracing::error!(
                            error = %e,
                            user_id = ?event.user_id,
                            "Failed to write level-up notification"
                        );
                    }
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification writer lagged, events were dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::debug!("Event bus closed, notification writer shutting down");
                    break;
                }
            }
        }
    }

    /// Build the notification for one level-advanced event, if it names a user.
    pub fn notification_for(event: &StudioEvent) -> Option<NewNotification> {
        let user_id = event.user_id.clone()?;
        let message = match event.payload["message"].as_str() {
            Some(message) if !message.trim().is_empty() => message.to_string(),
            _ => {
                let level = event.payload["level_name"].as_str().unwrap_or("a new level");
                format!("Advanced to {level}!")
            }
        };
        Some(NewNotification { user_id, message })
    }

    async fn write(store: &dyn DataStore, event: &StudioEvent) -> Result<(), StoreError> {
        match Self::notification_for(event) {
            Some(notification) => NotificationRepo::create(store, &notification).await,
            None => {
                tracing::warn!("Level-advanced event without a user, skipping notification");
                Ok(())
            }
        }
    }
}
