//! JWT claim set carried by hub credentials.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use gavel_core::{AuctionRole, Identity, UserId};

use crate::errors::{AuthError, Result};

/// Claims the auth collaborator signs into a hub credential.
///
/// `sub` and at least one `auctions` entry are required; `name` falls back
/// to the user ID when the issuer omits it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    /// User ID (standard `sub` claim).
    pub sub: String,
    /// Display name shown to other participants.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Auction entitlements: auction ID → role.
    #[serde(default)]
    pub auctions: BTreeMap<String, AuctionRole>,
    /// Expiry, seconds since the Unix epoch (standard `exp` claim).
    pub exp: u64,
}

impl AccessClaims {
    /// Convert validated claims into the session's immutable identity.
    pub fn into_identity(self) -> Result<Identity> {
        if self.sub.is_empty() {
            return Err(AuthError::MissingClaim("sub"));
        }
        if self.auctions.is_empty() {
            return Err(AuthError::MissingClaim("auctions"));
        }
        let display_name = self.name.unwrap_or_else(|| self.sub.clone());
        Ok(Identity {
            user_id: UserId::from(self.sub),
            display_name,
            entitlements: self
                .auctions
                .into_iter()
                .map(|(id, role)| (id.into(), role))
                .collect(),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
