//! `gavel` — the auction hub server binary.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use gavel_auth::{ClaimsCatalog, TokenValidator};
use gavel_core::LogAlertSink;
use gavel_hub::{MessageRouter, PersistenceGateway, RoomRegistry, SessionArena};
use gavel_server::{HubServer, ServerConfig};
use gavel_settings::HubSettings;
use gavel_store::{ConnectionConfig, SqliteChatStore};

/// Real-time auction hub: authenticated WebSocket rooms, chat, and bid
/// fan-out.
#[derive(Debug, Parser)]
#[command(name = "gavel", version)]
struct Args {
    /// Settings file (default: ~/.gavel/settings.json).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port.
    #[arg(long)]
    port: Option<u16>,

    /// Override the chat archive path.
    #[arg(long)]
    db: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    gavel_telemetry::init_logging("info");

    let args = Args::parse();
    let mut settings = match &args.config {
        Some(path) => gavel_settings::load_settings_from_path(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => gavel_settings::load_settings().context("loading settings")?,
    };
    if let Some(host) = args.host {
        settings.server.host = host;
    }
    if let Some(port) = args.port {
        settings.server.port = port;
    }
    if let Some(db) = args.db {
        settings.chat.db_path = db;
    }

    anyhow::ensure!(
        !settings.auth.secret.is_empty(),
        "auth secret is not configured (set `auth.secret` in the settings file or GAVEL_AUTH_SECRET)"
    );

    let metrics = gavel_telemetry::install_metrics_recorder();

    // Chat archive
    let pool = gavel_store::new_file(&settings.chat.db_path, &ConnectionConfig::default())
        .with_context(|| format!("opening chat archive at {}", settings.chat.db_path))?;
    {
        let conn = pool.get().context("checking out archive connection")?;
        let applied = gavel_store::run_migrations(&conn).context("migrating chat archive")?;
        info!(path = %settings.chat.db_path, applied, "chat archive ready");
    }
    let archive = Arc::new(SqliteChatStore::new(pool));

    // Hub core
    let gateway = Arc::new(PersistenceGateway::spawn(
        archive,
        Arc::new(LogAlertSink),
        settings.chat.retry.clone(),
        settings.chat.persist_queue_capacity,
    ));
    let router = Arc::new(MessageRouter::new(
        Arc::new(SessionArena::new()),
        Arc::new(RoomRegistry::new()),
        Arc::new(ClaimsCatalog),
        Arc::clone(&gateway),
    ));
    let validator = Arc::new(TokenValidator::new(
        settings.auth.secret.as_bytes(),
        settings.auth.expiry_leeway_secs,
    ));

    let server = HubServer::new(server_config(&settings), router, validator, Some(metrics));
    let (addr, serve_handle) = server.listen().await.context("binding listener")?;
    info!(addr = %addr, "gavel hub ready");

    tokio::signal::ctrl_c()
        .await
        .context("listening for ctrl-c")?;
    info!("shutting down");

    // Stop accepting and close live connections, then drain the archive
    // queue so accepted messages still land.
    server
        .shutdown()
        .graceful_shutdown(vec![serve_handle], None)
        .await;
    gateway.close().await;

    Ok(())
}

fn server_config(settings: &HubSettings) -> ServerConfig {
    ServerConfig {
        host: settings.server.host.clone(),
        port: settings.server.port,
        send_queue_capacity: settings.server.send_queue_capacity,
        heartbeat_interval_secs: settings.server.heartbeat_interval_secs,
        heartbeat_timeout_secs: settings.server.heartbeat_timeout_secs,
        max_connections: settings.server.max_connections,
    }
}
