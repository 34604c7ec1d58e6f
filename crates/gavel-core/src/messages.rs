//! Chat and bid message model.

use serde::{Deserialize, Serialize};

use crate::identity::AuctionRole;
use crate::ids::{AuctionId, MessageId, UserId};

/// Current wall-clock time in milliseconds since the Unix epoch.
#[must_use]
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// An opaque bid announcement payload.
///
/// The hub relays bid broadcasts verbatim; validating the bid (reserve
/// checks, increments, winner computation) is the pricing collaborator's
/// job, so no structure is imposed here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BidPayload(pub serde_json::Value);

/// One chat message as accepted by the router.
///
/// Immutable once constructed; `sent_at_ms` is assigned at receipt and is
/// non-decreasing within a room. Durable storage is idempotent on
/// `message_id`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Fresh ID assigned by the router at receipt.
    pub message_id: MessageId,
    /// Room this message was accepted into.
    pub auction_id: AuctionId,
    /// Sending participant.
    pub sender_id: UserId,
    /// Sender's display name at time of send.
    pub sender_name: String,
    /// Sender's role in the auction at time of send.
    pub category: AuctionRole,
    /// Message text.
    pub body: String,
    /// Receipt timestamp, milliseconds since epoch, monotonic per room.
    pub sent_at_ms: i64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ChatMessage {
        ChatMessage {
            message_id: MessageId::from("m1"),
            auction_id: AuctionId::from("A1"),
            sender_id: UserId::from("alice"),
            sender_name: "Alice".into(),
            category: AuctionRole::Bidder,
            body: "hello".into(),
            sent_at_ms: 1_700_000_000_000,
        }
    }

    #[test]
    fn now_ms_is_positive_and_advances() {
        let a = now_ms();
        assert!(a > 1_600_000_000_000);
        let b = now_ms();
        assert!(b >= a);
    }

    #[test]
    fn chat_message_serde_roundtrip() {
        let msg = sample();
        let json = serde_json::to_string(&msg).unwrap();
        let back: ChatMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn chat_message_serializes_role_as_category() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["category"], "bidder");
        assert_eq!(json["sender_id"], "alice");
    }

    #[test]
    fn bid_payload_is_transparent_json() {
        let bid = BidPayload(serde_json::json!({"amount": 250, "lot": "vase"}));
        let json = serde_json::to_string(&bid).unwrap();
        assert_eq!(json, r#"{"amount":250,"lot":"vase"}"#);
        let back: BidPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bid);
    }
}
