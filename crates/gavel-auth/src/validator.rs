//! Stateless bearer credential validation.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tracing::debug;

use gavel_core::Identity;

use crate::claims::AccessClaims;
use crate::errors::Result;

/// Verifies hub credentials against the shared secret.
///
/// Stateless and `Send + Sync`; one instance is shared by every connection
/// attempt. Must succeed before a session is admitted anywhere near a room.
pub struct TokenValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenValidator {
    /// Build a validator from the shared secret and expiry leeway window.
    #[must_use]
    pub fn new(secret: &[u8], leeway_secs: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = leeway_secs;
        validation.set_required_spec_claims(&["exp"]);
        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Validate a credential and derive the session identity.
    ///
    /// Fails if the signature is invalid, the token is expired (beyond the
    /// leeway), or the required claims are missing.
    pub fn validate(&self, credential: &str) -> Result<Identity> {
        let data = decode::<AccessClaims>(credential, &self.decoding_key, &self.validation)?;
        let identity = data.claims.into_identity()?;
        debug!(user_id = %identity.user_id, "credential validated");
        Ok(identity)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
