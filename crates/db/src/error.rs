/// Errors raised by a [`DataStore`](crate::DataStore).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A query referenced an identifier that cannot be used safely.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// A row did not have the shape its model expects.
    #[error("Malformed {entity} row: {message}")]
    Decode {
        entity: &'static str,
        message: String,
    },

    /// The backend reported a failure.
    #[error("Backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Create a backend error from any displayable error.
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        Self::Backend(err.to_string())
    }
}
