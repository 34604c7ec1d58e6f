//! Error types for the chat archive.

use thiserror::Error;

use gavel_core::StorageError;

/// Errors from chat archive operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `SQLite` database error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error (exhausted or backend unreachable).
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Schema migration failed.
    #[error("migration error: {message}")]
    Migration {
        /// Which migration failed and why.
        message: String,
    },

    /// Invalid stored data (e.g. an unknown role string).
    #[error("corrupt row: {0}")]
    CorruptRow(String),

    /// Internal error (e.g. a blocking task failed to complete).
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for StorageError {
    fn from(err: StoreError) -> Self {
        // Everything the archive can fail with at runtime is transient from
        // the gateway's point of view; retry decides how far to push.
        Self::Unavailable(err.to_string())
    }
}

/// Convenience alias for archive results.
pub type Result<T> = std::result::Result<T, StoreError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
