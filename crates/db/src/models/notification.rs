//! Notification rows.

use encore_core::types::UserId;
use serde_json::Value;

use crate::query::Row;

/// DTO for inserting a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub user_id: UserId,
    pub message: String,
}

impl NewNotification {
    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("userId".into(), Value::from(self.user_id.clone()));
        row.insert("message".into(), Value::from(self.message.clone()));
        row
    }
}
