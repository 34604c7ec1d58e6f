//! Inbound and outbound event taxonomy.
//!
//! Both directions use internally tagged JSON (`{"type": "...", ...}`).
//! [`ClientEvent`] is what a connected participant (or the auction-close
//! scheduler) sends in; [`RoomEvent`] is what the hub fans out to room
//! members.

use serde::{Deserialize, Serialize};

use crate::identity::AuctionRole;
use crate::ids::{AuctionId, SessionId, UserId};
use crate::messages::{BidPayload, ChatMessage};

/// Events accepted from a connected client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// Enter the room for `auction_id`. Requires an authenticated session
    /// that is not currently in any room.
    #[serde(rename = "join")]
    Join {
        /// Auction to join.
        auction_id: AuctionId,
    },

    /// Leave the current room, returning to the authenticated state.
    #[serde(rename = "leave")]
    Leave,

    /// Send a chat message to the current room.
    #[serde(rename = "chat")]
    Chat {
        /// Message text.
        body: String,
    },

    /// Announce a bid to the current room. The payload is relayed opaquely;
    /// bid validation belongs to the pricing collaborator.
    #[serde(rename = "bid_broadcast")]
    BidBroadcast {
        /// Opaque bid payload.
        bid: BidPayload,
    },

    /// Close a room and evict its members. Accepted over the wire only
    /// from the auction's seller; the close scheduler calls the router
    /// directly instead.
    #[serde(rename = "room_closed")]
    RoomClosed {
        /// Auction whose room is closing.
        auction_id: AuctionId,
    },
}

impl ClientEvent {
    /// Event name used in errors and logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::Leave => "leave",
            Self::Chat { .. } => "chat",
            Self::BidBroadcast { .. } => "bid_broadcast",
            Self::RoomClosed { .. } => "room_closed",
        }
    }
}

/// Events the hub delivers to room members.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RoomEvent {
    /// First event on every connection; tells the client its session ID.
    #[serde(rename = "session_established")]
    SessionEstablished {
        /// The hub-assigned session ID.
        session_id: SessionId,
        /// The authenticated user.
        user_id: UserId,
    },

    /// A participant entered the room. Sent to members present before the
    /// join, not to the joiner.
    #[serde(rename = "participant_joined")]
    ParticipantJoined {
        /// Room in question.
        auction_id: AuctionId,
        /// Joining user.
        user_id: UserId,
        /// Joining user's display name.
        display_name: String,
        /// Joining user's role in this auction.
        role: AuctionRole,
        /// Receipt timestamp.
        sent_at_ms: i64,
    },

    /// A participant left (or was disconnected). Sent to the remaining
    /// members.
    #[serde(rename = "participant_left")]
    ParticipantLeft {
        /// Room in question.
        auction_id: AuctionId,
        /// Departing user.
        user_id: UserId,
        /// Departing user's display name.
        display_name: String,
        /// Receipt timestamp.
        sent_at_ms: i64,
    },

    /// A chat message accepted into the room.
    #[serde(rename = "chat")]
    Chat(ChatMessage),

    /// A bid announcement relayed to the room.
    #[serde(rename = "bid")]
    Bid {
        /// Room in question.
        auction_id: AuctionId,
        /// Announcing user.
        sender_id: UserId,
        /// Announcing user's display name.
        sender_name: String,
        /// Opaque bid payload, relayed verbatim.
        bid: BidPayload,
        /// Receipt timestamp.
        sent_at_ms: i64,
    },

    /// The room is closing; every member is about to be evicted.
    #[serde(rename = "room_closed")]
    RoomClosed {
        /// Auction whose room closed.
        auction_id: AuctionId,
    },

    /// An inbound event was refused. The session stays connected.
    #[serde(rename = "rejected")]
    Rejected {
        /// Machine-readable refusal code (see `HubError::code`).
        reason: String,
        /// Human-readable detail.
        detail: String,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
