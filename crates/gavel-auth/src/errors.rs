//! Error types for credential validation.

use thiserror::Error;

use gavel_core::HubError;

/// Why a bearer credential was refused.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Signature invalid, token malformed, or expired.
    #[error("credential rejected: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    /// A claim the hub requires was absent or empty.
    #[error("credential missing required claim: {0}")]
    MissingClaim(&'static str),
}

impl From<AuthError> for HubError {
    fn from(err: AuthError) -> Self {
        Self::Unauthorized(err.to_string())
    }
}

/// Convenience alias for auth results.
pub type Result<T> = std::result::Result<T, AuthError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_claim_display() {
        let err = AuthError::MissingClaim("sub");
        assert_eq!(err.to_string(), "credential missing required claim: sub");
    }

    #[test]
    fn converts_to_unauthorized() {
        let hub: HubError = AuthError::MissingClaim("auctions").into();
        assert_eq!(hub.code(), "unauthorized");
        assert!(hub.to_string().contains("auctions"));
    }

    #[test]
    fn jwt_error_converts() {
        let jwt_err = jsonwebtoken::errors::Error::from(
            jsonwebtoken::errors::ErrorKind::InvalidToken,
        );
        let err: AuthError = jwt_err.into();
        assert!(err.to_string().starts_with("credential rejected"));
    }
}
