//! The backend query facade.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;
use crate::query::{Entity, Query, Row};

/// Row-level access to the backend.
///
/// Implementations must be thread-safe (`Send + Sync`); callers share one
/// store behind an `Arc` across every component of a session.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Fetch every row of `query.entity` matching the filters, in the
    /// requested order. No matches is an empty vector, not an error.
    async fn fetch_where(&self, query: &Query) -> Result<Vec<Row>, StoreError>;

    /// Set `fields` on the row whose key column equals `id`. Updating an id
    /// that does not exist is not an error.
    async fn update(&self, entity: Entity, id: &str, fields: Row) -> Result<(), StoreError>;

    /// Insert one or more rows.
    async fn insert(&self, entity: Entity, rows: Vec<Row>) -> Result<(), StoreError>;

    /// Call a named backend function with keyword arguments.
    async fn rpc(&self, function: &str, args: Value) -> Result<Value, StoreError>;
}
