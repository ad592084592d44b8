//! Typed rows decoded from the backend's JSON rows.
//!
//! Column names follow the backend schema, which mixes camelCase
//! (`userId`, `minPoints`) and snake_case (`studio_id`). Decoding is
//! lenient where the backend is: ids may be strings or numbers, point
//! columns may be missing or non-numeric.

pub mod activity_log;
pub mod level;
pub mod notification;
pub mod studio_member;
pub mod user;

mod de;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::StoreError;
use crate::query::{Entity, Row};

/// Decode one row into a model.
pub(crate) fn decode<T: DeserializeOwned>(entity: Entity, row: Row) -> Result<T, StoreError> {
    serde_json::from_value(Value::Object(row)).map_err(|e| StoreError::Decode {
        entity: entity.label(),
        message: e.to_string(),
    })
}

/// Decode every row, failing on the first malformed one.
pub(crate) fn decode_all<T: DeserializeOwned>(
    entity: Entity,
    rows: Vec<Row>,
) -> Result<Vec<T>, StoreError> {
    rows.into_iter().map(|row| decode(entity, row)).collect()
}
