//! Claims-backed auction authorization.

use async_trait::async_trait;

use gavel_core::{AuctionCatalog, AuctionId, HubError, Identity};

/// [`AuctionCatalog`] that answers from the credential's own entitlement
/// claims.
///
/// This is the default deployment shape: the auth collaborator already
/// consulted the catalog when it minted the credential, so the claims are
/// the authorization. Deployments that need a live existence check swap in
/// a catalog-service client behind the same trait.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClaimsCatalog;

#[async_trait]
impl AuctionCatalog for ClaimsCatalog {
    async fn authorize(
        &self,
        identity: &Identity,
        auction_id: &AuctionId,
    ) -> Result<(), HubError> {
        if identity.role_in(auction_id).is_some() {
            Ok(())
        } else {
            Err(HubError::ForbiddenAuction(auction_id.clone()))
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use gavel_core::{AuctionRole, UserId};

    fn carol() -> Identity {
        Identity {
            user_id: UserId::from("carol"),
            display_name: "Carol".into(),
            entitlements: [(AuctionId::from("A9"), AuctionRole::Observer)]
                .into_iter()
                .collect(),
        }
    }

    #[tokio::test]
    async fn entitled_auction_is_authorized() {
        let result = ClaimsCatalog
            .authorize(&carol(), &AuctionId::from("A9"))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn unentitled_auction_is_forbidden() {
        let result = ClaimsCatalog
            .authorize(&carol(), &AuctionId::from("A1"))
            .await;
        assert_matches!(result, Err(HubError::ForbiddenAuction(id)) if id.as_str() == "A1");
    }
}
