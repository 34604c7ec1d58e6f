//! Async [`ChatStore`] backend over the pooled `SQLite` archive.

use async_trait::async_trait;
use tracing::debug;

use gavel_core::{AuctionId, ChatMessage, ChatStore, StorageError};

use crate::chat::ChatRepo;
use crate::connection::ConnectionPool;
use crate::errors::Result;

/// `SQLite`-backed chat archive.
///
/// Writes run on the blocking thread pool so the persistence worker's async
/// loop never parks on file I/O. Pool checkout failures and database errors
/// surface as [`StorageError::Unavailable`], which is what tells the
/// gateway to retry.
#[derive(Clone)]
pub struct SqliteChatStore {
    pool: ConnectionPool,
}

impl SqliteChatStore {
    /// Wrap a migrated connection pool.
    #[must_use]
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    /// Read back all archived messages for one auction, in receipt order.
    /// Used by ops tooling and tests; not on the hot path.
    pub async fn messages_for_auction(
        &self,
        auction_id: &AuctionId,
    ) -> Result<Vec<ChatMessage>> {
        let pool = self.pool.clone();
        let auction_id = auction_id.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            ChatRepo::messages_for_auction(&conn, &auction_id)
        })
        .await
        .map_err(|e| crate::errors::StoreError::Internal(format!("archive read task: {e}")))?
    }
}

#[async_trait]
impl ChatStore for SqliteChatStore {
    async fn persist(&self, message: &ChatMessage) -> std::result::Result<(), StorageError> {
        let pool = self.pool.clone();
        let message = message.clone();
        let written = tokio::task::spawn_blocking(move || -> Result<bool> {
            let conn = pool.get()?;
            ChatRepo::insert(&conn, &message)
        })
        .await
        .map_err(|e| StorageError::Unavailable(format!("archive write task failed: {e}")))??;

        if !written {
            debug!("duplicate message_id, archive unchanged");
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
