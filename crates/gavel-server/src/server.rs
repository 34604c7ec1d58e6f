//! `HubServer` — Axum HTTP + WebSocket server.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tracing::info;

use gavel_auth::TokenValidator;
use gavel_hub::MessageRouter;

use crate::config::ServerConfig;
use crate::connection;
use crate::health::{self, HealthResponse};
use crate::shutdown::ShutdownCoordinator;

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// The hub's message router (owns arena and registry).
    pub router: Arc<MessageRouter>,
    /// Credential validator, consulted before every upgrade.
    pub validator: Arc<TokenValidator>,
    /// Shutdown coordinator.
    pub shutdown: Arc<ShutdownCoordinator>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// When the server started.
    pub start_time: Instant,
    /// Prometheus handle backing `/metrics` (absent in most tests).
    pub metrics: Option<PrometheusHandle>,
}

/// The hub server.
pub struct HubServer {
    state: AppState,
}

impl HubServer {
    /// Assemble a server from its parts.
    #[must_use]
    pub fn new(
        config: ServerConfig,
        router: Arc<MessageRouter>,
        validator: Arc<TokenValidator>,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        Self {
            state: AppState {
                router,
                validator,
                shutdown: Arc::new(ShutdownCoordinator::new()),
                config: Arc::new(config),
                start_time: Instant::now(),
                metrics,
            },
        }
    }

    /// Build the Axum router with all routes.
    #[must_use]
    pub fn router(&self) -> Router {
        Router::new()
            .route("/ws", get(ws_handler))
            .route("/health", get(health_handler))
            .route("/metrics", get(metrics_handler))
            .with_state(self.state.clone())
            .layer(CorsLayer::permissive())
    }

    /// Bind and serve. Returns the bound address and the serve task.
    ///
    /// The serve task stops accepting when the shutdown coordinator is
    /// cancelled.
    pub async fn listen(&self) -> std::io::Result<(std::net::SocketAddr, JoinHandle<()>)> {
        let addr = format!("{}:{}", self.state.config.host, self.state.config.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        let local_addr = listener.local_addr()?;

        let router = self.router();
        let token = self.state.shutdown.token();
        let handle = tokio::spawn(async move {
            let shutdown = async move { token.cancelled().await };
            if let Err(e) = axum::serve(listener, router)
                .with_graceful_shutdown(shutdown)
                .await
            {
                tracing::error!(error = %e, "server task failed");
            }
        });

        info!(addr = %local_addr, "hub server listening");
        Ok((local_addr, handle))
    }

    /// The shutdown coordinator.
    #[must_use]
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.state.shutdown
    }

    /// The message router.
    #[must_use]
    pub fn hub_router(&self) -> &Arc<MessageRouter> {
        &self.state.router
    }

    /// The server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.state.config
    }
}

/// Extract the bearer credential from the `Authorization` header or, for
/// browser WebSocket clients that cannot set headers, the `token` query
/// parameter.
fn bearer_token(headers: &HeaderMap, params: &HashMap<String, String>) -> Option<String> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        if let Ok(value) = value.to_str() {
            if let Some(token) = value.strip_prefix("Bearer ") {
                return Some(token.to_owned());
            }
        }
    }
    params.get("token").cloned()
}

/// GET /ws — credential check, then WebSocket upgrade.
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(token) = bearer_token(&headers, &params) else {
        return (StatusCode::UNAUTHORIZED, "missing credential").into_response();
    };

    let identity = match state.validator.validate(&token) {
        Ok(identity) => identity,
        Err(err) => {
            info!(error = %err, "connection refused");
            return (StatusCode::UNAUTHORIZED, "invalid credential").into_response();
        }
    };

    if state.router.arena().len() >= state.config.max_connections {
        return (StatusCode::SERVICE_UNAVAILABLE, "connection limit reached").into_response();
    }

    ws.on_upgrade(move |socket| connection::run_connection(socket, identity, state))
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let connections = state.router.arena().len();
    let open_rooms = state.router.registry().room_count();
    Json(health::health_check(state.start_time, connections, open_rooms))
}

/// GET /metrics — Prometheus text exposition.
async fn metrics_handler(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
