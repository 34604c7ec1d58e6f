//! # gavel-core
//!
//! Foundation types for the Gavel auction hub:
//!
//! - Branded ID newtypes (UUID v7) for users, sessions, auctions, messages
//! - [`Identity`] and per-auction roles derived from validated credentials
//! - The chat/bid message model and the inbound/outbound event taxonomy
//! - The hub error taxonomy ([`HubError`])
//! - Retry/backoff math for the persistence path
//! - Collaborator traits for the seams the hub does not own
//!   (auction catalog, chat archive, operational alerting)

#![deny(unsafe_code)]

pub mod collaborators;
pub mod errors;
pub mod events;
pub mod identity;
pub mod ids;
pub mod messages;
pub mod retry;

pub use collaborators::{AlertSink, AuctionCatalog, ChatStore, LogAlertSink, StorageError};
pub use errors::HubError;
pub use events::{ClientEvent, RoomEvent};
pub use identity::{AuctionRole, Identity};
pub use ids::{AuctionId, MessageId, SessionId, UserId};
pub use messages::{BidPayload, ChatMessage, now_ms};
pub use retry::RetryConfig;
