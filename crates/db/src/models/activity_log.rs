//! Activity log entity model.

use encore_core::activity::LogStatus;
use encore_core::types::UserId;
use serde::Deserialize;

use super::de;

/// A row from the `logs` table.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityLog {
    #[serde(default, deserialize_with = "de::opt_id")]
    pub id: Option<String>,
    #[serde(rename = "userId", deserialize_with = "de::id")]
    pub user_id: UserId,
    /// Missing or non-numeric points count as zero.
    #[serde(default, deserialize_with = "de::int_or_zero")]
    pub points: i64,
    /// `None` when the column holds an unknown status.
    #[serde(default, deserialize_with = "de::status")]
    pub status: Option<LogStatus>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}
