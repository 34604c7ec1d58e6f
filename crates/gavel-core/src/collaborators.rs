//! Traits for the seams the hub does not own.
//!
//! The hub consumes three external collaborators: the auction catalog
//! (join-time authorization), the durable chat archive, and operational
//! alerting. Each is a trait here so the hub stays testable with in-memory
//! fakes and deployable against real backends.

use async_trait::async_trait;
use thiserror::Error;

use crate::errors::HubError;
use crate::identity::Identity;
use crate::ids::AuctionId;
use crate::messages::ChatMessage;

/// Failure modes of the durable chat archive.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend is temporarily unreachable; the write may be retried.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Join-time authorization / existence check, delegated to the
/// auction-catalog collaborator.
///
/// A negative answer fails the join with [`HubError::ForbiddenAuction`];
/// the hub itself never verifies auction existence.
#[async_trait]
pub trait AuctionCatalog: Send + Sync {
    /// Check that `identity` may enter `auction_id`.
    async fn authorize(&self, identity: &Identity, auction_id: &AuctionId)
    -> Result<(), HubError>;
}

/// Durable chat archive keyed by message ID.
///
/// Implementations must treat repeated calls with the same `message_id` as
/// idempotent no-ops: the retry loop may re-deliver a message whose first
/// write actually landed.
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Durably record one chat message.
    async fn persist(&self, message: &ChatMessage) -> Result<(), StorageError>;
}

/// Operational alerting collaborator.
///
/// Receives the failures that exhaust their retry budget; live delivery has
/// already happened by the time this fires, so these are
/// history-loss notifications, not delivery failures.
pub trait AlertSink: Send + Sync {
    /// A chat message could not be archived within the retry budget.
    fn chat_archive_failed(&self, message: &ChatMessage, attempts: u32, last_error: &StorageError);
}

/// [`AlertSink`] that reports through the `tracing` error stream.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogAlertSink;

impl AlertSink for LogAlertSink {
    fn chat_archive_failed(&self, message: &ChatMessage, attempts: u32, last_error: &StorageError) {
        tracing::error!(
            message_id = %message.message_id,
            auction_id = %message.auction_id,
            attempts,
            error = %last_error,
            "chat message lost to archive after retry budget"
        );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::AuctionRole;
    use crate::ids::{MessageId, UserId};

    fn sample_message() -> ChatMessage {
        ChatMessage {
            message_id: MessageId::from("m1"),
            auction_id: AuctionId::from("A1"),
            sender_id: UserId::from("alice"),
            sender_name: "Alice".into(),
            category: AuctionRole::Bidder,
            body: "hi".into(),
            sent_at_ms: 1,
        }
    }

    #[test]
    fn storage_error_display() {
        let err = StorageError::Unavailable("pool timed out".into());
        assert_eq!(err.to_string(), "storage unavailable: pool timed out");
    }

    #[test]
    fn log_alert_sink_does_not_panic() {
        let sink = LogAlertSink;
        sink.chat_archive_failed(
            &sample_message(),
            4,
            &StorageError::Unavailable("down".into()),
        );
    }

    #[tokio::test]
    async fn traits_are_object_safe() {
        struct AllowAll;

        #[async_trait]
        impl AuctionCatalog for AllowAll {
            async fn authorize(
                &self,
                _identity: &Identity,
                _auction_id: &AuctionId,
            ) -> Result<(), HubError> {
                Ok(())
            }
        }

        let catalog: Box<dyn AuctionCatalog> = Box::new(AllowAll);
        let identity = Identity {
            user_id: UserId::from("u"),
            display_name: "U".into(),
            entitlements: std::collections::BTreeMap::new(),
        };
        assert!(
            catalog
                .authorize(&identity, &AuctionId::from("A1"))
                .await
                .is_ok()
        );
    }
}
