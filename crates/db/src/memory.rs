//! In-memory [`DataStore`] for tests and local fixtures.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;
use crate::query::{loosely_equal, Entity, Query, Row};
use crate::store::DataStore;

/// Handler invoked for [`DataStore::rpc`] calls to a registered function.
pub type RpcHandler = Arc<dyn Fn(&Value) -> Result<Value, StoreError> + Send + Sync>;

#[derive(Default)]
struct State {
    tables: HashMap<Entity, Vec<Row>>,
    failing_reads: HashSet<Entity>,
    failing_writes: HashSet<Entity>,
    rpc_handlers: HashMap<String, RpcHandler>,
    rpc_calls: Vec<(String, Value)>,
    next_id: i64,
}

/// Tables held in memory, with switches to make reads or writes fail.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append rows to a table. Non-object values are ignored.
    pub fn seed<I>(&self, entity: Entity, rows: I)
    where
        I: IntoIterator<Item = Value>,
    {
        let mut state = self.lock();
        let table = state.tables.entry(entity).or_default();
        table.extend(rows.into_iter().filter_map(|value| match value {
            Value::Object(row) => Some(row),
            _ => None,
        }));
    }

    /// Snapshot a table.
    pub fn rows(&self, entity: Entity) -> Vec<Row> {
        self.lock().tables.get(&entity).cloned().unwrap_or_default()
    }

    /// Make every read of `entity` fail until switched off.
    pub fn fail_reads(&self, entity: Entity, failing: bool) {
        let mut state = self.lock();
        if failing {
            state.failing_reads.insert(entity);
        } else {
            state.failing_reads.remove(&entity);
        }
    }

    /// Make every write to `entity` fail until switched off.
    pub fn fail_writes(&self, entity: Entity, failing: bool) {
        let mut state = self.lock();
        if failing {
            state.failing_writes.insert(entity);
        } else {
            state.failing_writes.remove(&entity);
        }
    }

    /// Register the handler for an RPC function.
    pub fn on_rpc<F>(&self, function: &str, handler: F)
    where
        F: Fn(&Value) -> Result<Value, StoreError> + Send + Sync + 'static,
    {
        self.lock()
            .rpc_handlers
            .insert(function.to_string(), Arc::new(handler));
    }

    /// Number of calls made to `function` so far.
    pub fn rpc_calls(&self, function: &str) -> usize {
        self.lock()
            .rpc_calls
            .iter()
            .filter(|(name, _)| name == function)
            .count()
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn fetch_where(&self, query: &Query) -> Result<Vec<Row>, StoreError> {
        let state = self.lock();
        if state.failing_reads.contains(&query.entity) {
            return Err(StoreError::Backend(format!(
                "read of {} failed",
                query.entity.table()
            )));
        }
        let mut rows: Vec<Row> = state
            .tables
            .get(&query.entity)
            .map(|table| table.iter().filter(|r| query.matches(r)).cloned().collect())
            .unwrap_or_default();
        rows.sort_by(|a, b| query.compare(a, b));
        Ok(rows)
    }

    async fn update(&self, entity: Entity, id: &str, fields: Row) -> Result<(), StoreError> {
        let mut state = self.lock();
        if state.failing_writes.contains(&entity) {
            return Err(StoreError::Backend(format!(
                "update of {} failed",
                entity.table()
            )));
        }
        let key = Value::String(id.to_string());
        if let Some(table) = state.tables.get_mut(&entity) {
            for row in table.iter_mut() {
                let matches = row
                    .get(entity.key_column())
                    .is_some_and(|v| loosely_equal(v, &key));
                if matches {
                    row.extend(fields.clone());
                }
            }
        }
        Ok(())
    }

    async fn insert(&self, entity: Entity, rows: Vec<Row>) -> Result<(), StoreError> {
        let mut state = self.lock();
        if state.failing_writes.contains(&entity) {
            return Err(StoreError::Backend(format!(
                "insert into {} failed",
                entity.table()
            )));
        }
        for mut row in rows {
            if !row.contains_key(entity.key_column()) {
                state.next_id += 1;
                row.insert(entity.key_column().to_string(), Value::from(state.next_id));
            }
            state.tables.entry(entity).or_default().push(row);
        }
        Ok(())
    }

    async fn rpc(&self, function: &str, args: Value) -> Result<Value, StoreError> {
        let handler = {
            let mut state = self.lock();
            state.rpc_calls.push((function.to_string(), args.clone()));
            state.rpc_handlers.get(function).cloned()
        };
        match handler {
            Some(handler) => handler(&args),
            None => Err(StoreError::Backend(format!(
                "function {function} does not exist"
            ))),
        }
    }
}
