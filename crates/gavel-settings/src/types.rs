//! Settings schema with compiled defaults.
//!
//! All keys are camelCase on disk. Every field has a default so a missing
//! or partial settings file always yields a working configuration, except
//! the auth secret, which deliberately defaults to empty and is checked at
//! startup.

use serde::{Deserialize, Serialize};

use gavel_core::RetryConfig;

/// Root settings object.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubSettings {
    /// Schema version of the settings file.
    #[serde(default)]
    pub version: u32,
    /// Server bind and connection limits.
    #[serde(default)]
    pub server: ServerSettings,
    /// Credential validation.
    #[serde(default)]
    pub auth: AuthSettings,
    /// Chat archive and persistence retry.
    #[serde(default)]
    pub chat: ChatSettings,
}

/// Server bind and per-connection settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSettings {
    /// Host to bind (default `"127.0.0.1"`).
    pub host: String,
    /// Port to bind (default `8090`; `0` auto-assigns, used by tests).
    pub port: u16,
    /// Bound capacity of each member's outbound queue. Overflow evicts the
    /// member (backpressure rule).
    pub send_queue_capacity: usize,
    /// Interval between server Ping frames, seconds.
    pub heartbeat_interval_secs: u64,
    /// Silence window after which an unresponsive member is disconnected,
    /// seconds.
    pub heartbeat_timeout_secs: u64,
    /// Maximum concurrent connections.
    pub max_connections: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8090,
            send_queue_capacity: 64,
            heartbeat_interval_secs: 30,
            heartbeat_timeout_secs: 90,
            max_connections: 1024,
        }
    }
}

/// Credential validation settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSettings {
    /// Shared HMAC secret for credential signatures. No default; must come
    /// from the settings file or `GAVEL_AUTH_SECRET`.
    pub secret: String,
    /// Expiry leeway window, seconds.
    pub expiry_leeway_secs: u64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            secret: String::new(),
            expiry_leeway_secs: 30,
        }
    }
}

/// Chat archive settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSettings {
    /// Path of the `SQLite` archive file.
    pub db_path: String,
    /// Bound capacity of the persistence gateway's queue.
    pub persist_queue_capacity: usize,
    /// Retry budget and backoff for archive writes.
    pub retry: RetryConfig,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            db_path: "gavel-chat.db".into(),
            persist_queue_capacity: 1024,
            retry: RetryConfig::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
