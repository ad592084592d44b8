use serde_json::Value;

/// Backend user ids are opaque strings (auth UUIDs).
pub type UserId = String;

/// Studio ids are compared by their string form; see [`id_from_value`].
pub type StudioId = String;

/// Level ids double as the rank of the bracket.
pub type LevelId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Render an id column as a string.
///
/// The backend returns some id columns as JSON strings and others as
/// numbers; both compare equal once rendered.
pub fn id_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Read an integer column. Missing, null and non-numeric values yield `None`.
pub fn int_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
