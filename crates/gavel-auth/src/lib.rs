//! # gavel-auth
//!
//! Bearer credential validation for the auction hub.
//!
//! Credentials are HMAC-SHA256 JWTs issued by the external auth
//! collaborator, carrying the user ID, display name, and an
//! auction-entitlement map. [`TokenValidator`] checks signature and expiry
//! and produces an immutable [`gavel_core::Identity`]; [`ClaimsCatalog`]
//! answers join-time authorization straight from those entitlements.

#![deny(unsafe_code)]

pub mod catalog;
pub mod claims;
pub mod errors;
pub mod validator;

pub use catalog::ClaimsCatalog;
pub use claims::AccessClaims;
pub use errors::AuthError;
pub use validator::TokenValidator;
