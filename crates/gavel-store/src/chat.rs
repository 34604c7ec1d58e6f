//! Chat message row operations.
//!
//! Stateless repository; every method takes `&Connection`. Inserts use
//! `INSERT OR IGNORE` keyed on `message_id`, which is what makes the
//! persistence retry loop safe: a retried write whose first attempt
//! actually landed is a no-op.

use rusqlite::{Connection, params};

use gavel_core::{AuctionId, AuctionRole, ChatMessage, MessageId, UserId};

use crate::errors::{Result, StoreError};

/// Chat archive repository.
pub struct ChatRepo;

impl ChatRepo {
    /// Insert a message. Returns `true` if a row was written, `false` if a
    /// row with this `message_id` already existed (idempotent duplicate).
    pub fn insert(conn: &Connection, message: &ChatMessage) -> Result<bool> {
        let rows = conn.execute(
            "INSERT OR IGNORE INTO chat_messages
             (message_id, auction_id, sender_id, sender_name, category, body, sent_at_ms)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                message.message_id.as_str(),
                message.auction_id.as_str(),
                message.sender_id.as_str(),
                message.sender_name,
                message.category.as_str(),
                message.body,
                message.sent_at_ms,
            ],
        )?;
        Ok(rows == 1)
    }

    /// All messages for one auction, in receipt order.
    pub fn messages_for_auction(
        conn: &Connection,
        auction_id: &AuctionId,
    ) -> Result<Vec<ChatMessage>> {
        let mut stmt = conn.prepare(
            "SELECT message_id, auction_id, sender_id, sender_name, category, body, sent_at_ms
             FROM chat_messages
             WHERE auction_id = ?1
             ORDER BY sent_at_ms ASC, message_id ASC",
        )?;
        let rows = stmt
            .query_map(params![auction_id.as_str()], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter().collect()
    }

    /// Number of archived messages for one auction.
    pub fn count_for_auction(conn: &Connection, auction_id: &AuctionId) -> Result<i64> {
        let count = conn.query_row(
            "SELECT COUNT(*) FROM chat_messages WHERE auction_id = ?1",
            params![auction_id.as_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Result<ChatMessage>> {
        let category_str: String = row.get(4)?;
        let message = match AuctionRole::parse(&category_str) {
            Some(category) => Ok(ChatMessage {
                message_id: MessageId::from(row.get::<_, String>(0)?),
                auction_id: AuctionId::from(row.get::<_, String>(1)?),
                sender_id: UserId::from(row.get::<_, String>(2)?),
                sender_name: row.get(3)?,
                category,
                body: row.get(5)?,
                sent_at_ms: row.get(6)?,
            }),
            None => Err(StoreError::CorruptRow(format!(
                "unknown category '{category_str}'"
            ))),
        };
        Ok(message)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
