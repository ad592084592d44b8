//! Data access for the Encore backend.
//!
//! The backend is reached through the [`DataStore`] facade: row-oriented
//! `fetch_where` / `update` / `insert` plus named RPC calls. Rows are JSON
//! objects, decoded into typed [`models`] by the [`repositories`].
//!
//! Two stores are provided:
//! - [`PgStore`] talks to the backend's Postgres database through `sqlx`.
//! - [`MemoryStore`] keeps tables in memory, for tests and fixtures.

pub mod error;
pub mod memory;
pub mod models;
pub mod pg;
pub mod query;
pub mod repositories;
pub mod store;

use sqlx::postgres::PgPoolOptions;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use pg::PgStore;
pub use query::{Direction, Entity, Filter, Ordering, Query, Row};
pub use store::DataStore;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
}
