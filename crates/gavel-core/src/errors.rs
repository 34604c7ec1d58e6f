//! The hub error taxonomy.
//!
//! [`HubError`] covers every way the hub refuses work. Authorization
//! failures refuse the connection or the specific action; protocol-order
//! failures drop the offending event but keep the session connected;
//! storage failures are confined to the persistence path and never reach
//! connected members.

use thiserror::Error;

use crate::ids::AuctionId;

/// Errors surfaced by the hub's session, registry, and routing layers.
#[derive(Debug, Error)]
pub enum HubError {
    /// Credential missing, malformed, badly signed, or expired. The
    /// connection is refused before a session exists.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Credential is valid but carries no entitlement for this auction.
    /// The join is refused; the session stays authenticated.
    #[error("not entitled to auction {0}")]
    ForbiddenAuction(AuctionId),

    /// The session is already registered in a room. The event is dropped
    /// and the session notified; it must leave first.
    #[error("session is already a member of a room")]
    AlreadyMember,

    /// Event arrived outside the state that allows it. Dropped, notified,
    /// recoverable.
    #[error("event {event} not valid in state {state}")]
    InvalidState {
        /// State the session was in.
        state: &'static str,
        /// Event that was rejected.
        event: &'static str,
    },

    /// The chat archive is temporarily unreachable. Retried with bounded
    /// backoff on the persistence path only.
    #[error("chat storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl HubError {
    /// Stable machine-readable code, used in `rejected` wire events.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "unauthorized",
            Self::ForbiddenAuction(_) => "forbidden_auction",
            Self::AlreadyMember => "already_member",
            Self::InvalidState { .. } => "invalid_state",
            Self::StorageUnavailable(_) => "storage_unavailable",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
