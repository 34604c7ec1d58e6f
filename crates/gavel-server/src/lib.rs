//! # gavel-server
//!
//! Axum HTTP + `WebSocket` front end for the auction hub.
//!
//! - `GET /ws`: credential check (before upgrade), then the per-connection
//!   reader/writer loops with heartbeat
//! - `GET /health`: uptime, connection and room counts
//! - `GET /metrics`: Prometheus text exposition
//! - Graceful shutdown via a `CancellationToken` coordinator

#![deny(unsafe_code)]

pub mod config;
pub mod connection;
pub mod health;
pub mod server;
pub mod shutdown;

pub use config::ServerConfig;
pub use server::{AppState, HubServer};
pub use shutdown::ShutdownCoordinator;
