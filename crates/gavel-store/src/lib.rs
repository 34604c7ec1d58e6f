//! # gavel-store
//!
//! Durable chat archive on `SQLite`.
//!
//! - `r2d2`-pooled connections with WAL mode and pragma tuning
//! - Versioned, idempotent schema migrations
//! - [`ChatRepo`]: stateless row operations, idempotent on message ID
//! - [`SqliteChatStore`]: the async [`gavel_core::ChatStore`] backend used
//!   by the hub's persistence gateway

#![deny(unsafe_code)]

pub mod archive;
pub mod chat;
pub mod connection;
pub mod errors;
pub mod migrations;

pub use archive::SqliteChatStore;
pub use chat::ChatRepo;
pub use connection::{ConnectionConfig, ConnectionPool, new_file, new_in_memory};
pub use errors::StoreError;
pub use migrations::run_migrations;
