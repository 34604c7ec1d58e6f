//! # gavel-telemetry
//!
//! Observability bootstrap: structured logging via `tracing` and a
//! Prometheus metrics recorder via the `metrics` facade. Both are installed
//! once at startup by the `gavel` binary.

#![deny(unsafe_code)]

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Initialize the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` applies
/// (e.g. `"info"` or `"gavel=debug,info"`).
pub fn init_logging(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();
}

/// Install the global Prometheus metrics recorder.
///
/// Returns the handle the `/metrics` route renders from. Call once, before
/// any counters are touched.
pub fn install_metrics_recorder() -> PrometheusHandle {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install metrics recorder");
    info!("prometheus metrics recorder installed");
    handle
}

// Metric name constants, to avoid typos across crates.

/// WebSocket connections opened (counter).
pub const WS_CONNECTIONS_TOTAL: &str = "ws_connections_total";
/// WebSocket disconnections (counter).
pub const WS_DISCONNECTIONS_TOTAL: &str = "ws_disconnections_total";
/// Live WebSocket connections (gauge).
pub const WS_CONNECTIONS_ACTIVE: &str = "ws_connections_active";
/// Members evicted for overflowing their send queue (counter).
pub const WS_BACKPRESSURE_EVICTIONS_TOTAL: &str = "ws_backpressure_evictions_total";
/// Open auction rooms (gauge).
pub const HUB_ROOMS_ACTIVE: &str = "hub_rooms_active";
/// Chat messages accepted (counter).
pub const CHAT_MESSAGES_TOTAL: &str = "chat_messages_total";
/// Bid broadcasts relayed (counter).
pub const BID_BROADCASTS_TOTAL: &str = "bid_broadcasts_total";
/// Archive writes that exhausted their retry budget (counter).
pub const CHAT_PERSIST_FAILURES_TOTAL: &str = "chat_persist_failures_total";
/// Archive write retries (counter).
pub const CHAT_PERSIST_RETRIES_TOTAL: &str = "chat_persist_retries_total";

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
