//! User entity model and the points patch.

use encore_core::roles::RoleSet;
use encore_core::types::{LevelId, UserId};
use serde::Deserialize;
use serde_json::Value;

use super::de;
use crate::query::Row;

/// A row from the `users` table.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "de::id")]
    pub id: UserId,
    #[serde(default)]
    pub roles: RoleSet,
    /// Cached approved-points total.
    #[serde(default, deserialize_with = "de::int_or_zero")]
    pub points: i64,
    /// Cached level id.
    #[serde(default, deserialize_with = "de::opt_int")]
    pub level: Option<LevelId>,
    #[serde(default, rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(default, rename = "lastName")]
    pub last_name: Option<String>,
}

impl User {
    /// `"First Last"`, trimmed; empty when neither name is set.
    pub fn full_name(&self) -> String {
        let first = self.first_name.as_deref().unwrap_or_default();
        let last = self.last_name.as_deref().unwrap_or_default();
        format!("{first} {last}").trim().to_string()
    }
}

/// Fields written by points recalculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointsUpdate {
    pub points: i64,
    pub level: LevelId,
}

impl PointsUpdate {
    pub fn to_row(self) -> Row {
        let mut row = Row::new();
        row.insert("points".into(), Value::from(self.points));
        row.insert("level".into(), Value::from(self.level));
        row
    }
}
