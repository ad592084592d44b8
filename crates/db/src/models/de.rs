//! Lenient field deserializers shared by the models.

use encore_core::activity::LogStatus;
use encore_core::types::{id_from_value, int_from_value};
use serde::de::Error;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Required id, string or number.
pub(super) fn id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let value = Value::deserialize(d)?;
    id_from_value(&value).ok_or_else(|| D::Error::custom(format!("invalid id {value}")))
}

pub(super) fn opt_id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(id_from_value(&Value::deserialize(d)?))
}

/// Integer column where anything unusable counts as zero.
pub(super) fn int_or_zero<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    Ok(int_from_value(&Value::deserialize(d)?).unwrap_or(0))
}

pub(super) fn opt_int<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    Ok(int_from_value(&Value::deserialize(d)?))
}

/// Unknown statuses decode as `None` and never count as approved.
pub(super) fn status<'de, D: Deserializer<'de>>(d: D) -> Result<Option<LogStatus>, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(value.as_str().and_then(|s| LogStatus::parse(s).ok()))
}
