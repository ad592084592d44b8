//! Well-known role names and the canonical role set.
//!
//! Role tags reach us in several shapes: a JSON array, a comma-separated
//! string, or a lone scalar. [`RoleSet::from_value`] is the single place
//! those shapes are normalized; everything downstream works on `RoleSet`.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_TEACHER: &str = "teacher";
pub const ROLE_STUDENT: &str = "student";
pub const ROLE_PARENT: &str = "parent";

/// A lower-cased, de-duplicated set of role tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<String>);

impl RoleSet {
    pub fn new<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        roles
            .into_iter()
            .filter_map(|r| normalize_tag(r.as_ref()))
            .collect()
    }

    /// Parse a comma-separated role string, e.g. `"Teacher, admin"`.
    pub fn from_csv(raw: &str) -> Self {
        Self::new(raw.split(','))
    }

    /// Normalize any JSON shape the backend uses for roles.
    ///
    /// Arrays contribute each element, strings are split on commas, other
    /// scalars are taken as a single tag. `null` and objects yield an empty
    /// set.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Array(items) => items.iter().filter_map(scalar_tag).collect(),
            Value::String(s) => Self::from_csv(s),
            Value::Null | Value::Object(_) => Self::default(),
            other => scalar_tag(other).into_iter().collect(),
        }
    }

    pub fn contains(&self, role: &str) -> bool {
        normalize_tag(role).is_some_and(|r| self.0.contains(&r))
    }

    /// True when at least one of `required` is held.
    pub fn contains_any(&self, required: &[&str]) -> bool {
        required.iter().any(|r| self.contains(r))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// JSON array form, as written to persisted context.
    pub fn to_value(&self) -> Value {
        Value::Array(self.0.iter().cloned().map(Value::String).collect())
    }
}

impl FromIterator<String> for RoleSet {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'de> Deserialize<'de> for RoleSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.iter().collect();
        f.write_str(&joined.join(","))
    }
}

fn normalize_tag(raw: &str) -> Option<String> {
    let tag = raw.trim().to_lowercase();
    (!tag.is_empty()).then_some(tag)
}

fn scalar_tag(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => normalize_tag(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
