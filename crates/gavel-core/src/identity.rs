//! Participant identity as derived from a validated credential.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::{AuctionId, UserId};

/// What a participant is allowed to do in a given auction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuctionRole {
    /// May place bids and chat.
    Bidder,
    /// Runs the auction; may also close its room.
    Seller,
    /// Watch-only participant.
    Observer,
}

impl AuctionRole {
    /// Wire/storage representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bidder => "bidder",
            Self::Seller => "seller",
            Self::Observer => "observer",
        }
    }

    /// Parse the wire/storage representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "bidder" => Some(Self::Bidder),
            "seller" => Some(Self::Seller),
            "observer" => Some(Self::Observer),
            _ => None,
        }
    }
}

impl fmt::Display for AuctionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated participant identity.
///
/// Built once by the token validator and immutable for the lifetime of the
/// session. The entitlement map mirrors the credential's auction claims:
/// which auctions this participant may enter, and as what.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Unique user ID asserted by the auth collaborator.
    pub user_id: UserId,
    /// Human-readable name shown to other participants.
    pub display_name: String,
    /// Auction entitlements from the credential.
    pub entitlements: BTreeMap<AuctionId, AuctionRole>,
}

impl Identity {
    /// The participant's role in `auction_id`, if entitled at all.
    #[must_use]
    pub fn role_in(&self, auction_id: &AuctionId) -> Option<AuctionRole> {
        self.entitlements.get(auction_id).copied()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
