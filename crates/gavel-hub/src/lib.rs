//! # gavel-hub
//!
//! The concurrent core of the auction hub:
//!
//! - [`SessionHandle`]: one live connection's state machine and bounded
//!   outbound queue
//! - [`SessionArena`]: process-wide index of live sessions (rooms hold IDs,
//!   never direct references, so there are no ownership cycles)
//! - [`RoomRegistry`]: auction ID → member set, with per-room receipt-stamp
//!   monotonicity and empty-room reclamation
//! - [`MessageRouter`]: validates inbound events against session/room state
//!   and fans accepted events out to room members
//! - [`PersistenceGateway`]: fire-and-forget chat archival with bounded
//!   retry, off the fan-out path

#![deny(unsafe_code)]

pub mod arena;
pub mod persist;
pub mod registry;
pub mod router;
pub mod session;

pub use arena::SessionArena;
pub use persist::PersistenceGateway;
pub use registry::{FanOutReport, RoomRegistry};
pub use router::MessageRouter;
pub use session::{SessionHandle, SessionState};
