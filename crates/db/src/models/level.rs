//! Level bracket rows.

use encore_core::levels::Level;
use encore_core::types::LevelId;
use serde::Deserialize;

use super::de;

/// A row from the `levels` table, before conversion into a [`Level`].
#[derive(Debug, Clone, Deserialize)]
pub struct LevelRow {
    #[serde(deserialize_with = "de::int_or_zero")]
    pub id: LevelId,
    #[serde(default, rename = "minPoints", deserialize_with = "de::int_or_zero")]
    pub min_points: i64,
    /// Null or missing means the bracket has no ceiling.
    #[serde(default, rename = "maxPoints", deserialize_with = "de::opt_int")]
    pub max_points: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub badge: Option<String>,
}

impl From<LevelRow> for Level {
    fn from(row: LevelRow) -> Self {
        Level {
            id: row.id,
            min_points: row.min_points,
            max_points: row.max_points,
            name: row.name,
            badge: row.badge,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::decode;
    use crate::query::{Entity, Row};
    use serde_json::{json, Value};

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn decodes_bracket_with_null_ceiling() {
        let level: Level = decode::<LevelRow>(
            Entity::Levels,
            row(json!({"id": 5, "minPoints": 400, "maxPoints": null,
                       "name": "Maestro", "badge": "images/levels/5.png"})),
        )
        .unwrap()
        .into();
        assert_eq!(level.id, 5);
        assert_eq!(level.min_points, 400);
        assert_eq!(level.max_points, None);
        assert_eq!(level.badge.as_deref(), Some("images/levels/5.png"));
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let level: Level = decode::<LevelRow>(
            Entity::Levels,
            row(json!({"id": "2", "minPoints": "10", "maxPoints": "19"})),
        )
        .unwrap()
        .into();
        assert_eq!((level.id, level.min_points, level.max_points), (2, 10, Some(19)));
    }
}
