//! Backend-neutral query description.

use std::cmp;

use encore_core::types::id_from_value;
use serde_json::Value;

/// A backend row: column name to JSON value.
pub type Row = serde_json::Map<String, Value>;

/// Tables this crate reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Users,
    ActivityLogs,
    Levels,
    StudioMembers,
    Notifications,
}

impl Entity {
    /// Backend table name.
    pub fn table(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::ActivityLogs => "logs",
            Self::Levels => "levels",
            Self::StudioMembers => "studio_members",
            Self::Notifications => "notifications",
        }
    }

    /// Singular label used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Users => "user",
            Self::ActivityLogs => "activity log",
            Self::Levels => "level",
            Self::StudioMembers => "studio membership",
            Self::Notifications => "notification",
        }
    }

    /// Column used by [`DataStore::update`](crate::DataStore::update).
    pub fn key_column(self) -> &'static str {
        "id"
    }
}

/// Equality filter on one column.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ordering {
    pub column: String,
    pub direction: Direction,
}

/// `SELECT * FROM entity WHERE filters... ORDER BY ordering...`
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub entity: Entity,
    pub filters: Vec<Filter>,
    pub ordering: Vec<Ordering>,
}

impl Query {
    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            filters: Vec::new(),
            ordering: Vec::new(),
        }
    }

    /// Add an equality filter.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, direction: Direction) -> Self {
        self.ordering.push(Ordering {
            column: column.into(),
            direction,
        });
        self
    }

    /// Whether `row` passes every filter.
    pub fn matches(&self, row: &Row) -> bool {
        self.filters.iter().all(|f| {
            let actual = row.get(&f.column).unwrap_or(&Value::Null);
            loosely_equal(actual, &f.value)
        })
    }

    /// Compare two rows by this query's ordering. Nulls sort last when
    /// ascending and first when descending.
    pub fn compare(&self, a: &Row, b: &Row) -> cmp::Ordering {
        for ordering in &self.ordering {
            let ord = compare_values(a.get(&ordering.column), b.get(&ordering.column));
            let ord = match ordering.direction {
                Direction::Asc => ord,
                Direction::Desc => ord.reverse(),
            };
            if ord != cmp::Ordering::Equal {
                return ord;
            }
        }
        cmp::Ordering::Equal
    }
}

/// Equality the way the backend compares a column cast to text: ids and
/// numbers compare by their rendered form.
pub(crate) fn loosely_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        _ => match (id_from_value(a), id_from_value(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> cmp::Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => cmp::Ordering::Equal,
        (None, Some(_)) => cmp::Ordering::Greater,
        (Some(_), None) => cmp::Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(cmp::Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}
