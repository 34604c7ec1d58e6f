//! Per-connection lifecycle: reader/writer tasks, heartbeat, cleanup.
//!
//! By the time [`run_connection`] runs, the credential has already been
//! validated (the upgrade handler refuses bad credentials with a 401), so
//! the session moves straight from `Connecting` to `Authenticated` and is
//! announced to the client with a `session_established` event.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use metrics::{counter, gauge};
use tracing::{debug, info, warn};

use gavel_core::{ClientEvent, Identity, RoomEvent};
use gavel_hub::SessionHandle;

use crate::server::AppState;

/// Drive one authenticated WebSocket connection to completion.
///
/// 1. Registers the session in the arena and sends `session_established`
/// 2. Spawns the writer task (outbound queue + heartbeat pings)
/// 3. Dispatches inbound frames through the router
/// 4. Runs disconnect cleanup exactly once, from whichever signal fires
///    first (socket close, heartbeat timeout, eviction, server shutdown)
pub async fn run_connection(socket: WebSocket, identity: Identity, state: AppState) {
    let (session, mut rx) = SessionHandle::new(identity, state.config.send_queue_capacity);
    state.router.arena().insert(session.clone());
    if let Err(err) = session.mark_authenticated() {
        // only possible if something already tore the session down
        warn!(session_id = %session.id, error = %err, "session unusable at connect");
        state.router.disconnect(&session);
        return;
    }

    counter!("ws_connections_total").increment(1);
    gauge!("ws_connections_active").increment(1.0);
    info!(
        session_id = %session.id,
        user_id = %session.identity.user_id,
        "client connected"
    );

    let _ = session.send_event(&RoomEvent::SessionEstablished {
        session_id: session.id.clone(),
        user_id: session.identity.user_id.clone(),
    });

    let (mut ws_tx, mut ws_rx) = socket.split();

    // Writer task: drains the outbound queue, pings on the heartbeat
    // interval, and closes the socket when the session is cancelled.
    let writer_session = session.clone();
    let writer_router = Arc::clone(&state.router);
    let ping_every = Duration::from_secs(state.config.heartbeat_interval_secs);
    let silence_limit = Duration::from_secs(state.config.heartbeat_timeout_secs);
    let mut writer = tokio::spawn(async move {
        let mut ping_interval = tokio::time::interval(ping_every);
        // consume the immediate first tick
        let _ = ping_interval.tick().await;

        #[allow(clippy::cast_possible_truncation)]
        let max_missed =
            (silence_limit.as_secs() / ping_every.as_secs().max(1)).max(1) as u32;
        let mut missed: u32 = 0;
        let cancel = writer_session.cancel_token();

        loop {
            tokio::select! {
                msg = rx.recv() => {
                    match msg {
                        Some(json) => {
                            if ws_tx.send(Message::Text((*json).clone().into())).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    }
                }
                _ = ping_interval.tick() => {
                    if writer_session.check_alive() {
                        missed = 0;
                    } else {
                        missed += 1;
                        if missed >= max_missed {
                            warn!(
                                session_id = %writer_session.id,
                                "client unresponsive past heartbeat timeout, disconnecting"
                            );
                            writer_router.disconnect(&writer_session);
                            break;
                        }
                    }
                    if ws_tx.send(Message::Ping(Vec::new().into())).await.is_err() {
                        break;
                    }
                }
                () = cancel.cancelled() => {
                    let _ = ws_tx.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    });

    // Reader loop: dispatch inbound frames until any disconnect signal.
    let cancel = session.cancel_token();
    let shutdown = state.shutdown.token();
    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        session.mark_alive();
                        process_event(&state, &session, text.as_str()).await;
                    }
                    Message::Binary(data) => {
                        session.mark_alive();
                        match std::str::from_utf8(&data) {
                            Ok(text) => process_event(&state, &session, text).await,
                            Err(_) => {
                                info!(
                                    session_id = %session.id,
                                    len = data.len(),
                                    "ignoring non-UTF8 binary frame"
                                );
                            }
                        }
                    }
                    Message::Ping(_) | Message::Pong(_) => session.mark_alive(),
                    Message::Close(_) => {
                        debug!(session_id = %session.id, "client sent close frame");
                        break;
                    }
                }
            }
            () = cancel.cancelled() => break,
            () = shutdown.cancelled() => break,
        }
    }

    // Cleanup (one-shot guarded), whichever signal got us here.
    state.router.disconnect(&session);
    counter!("ws_disconnections_total").increment(1);
    gauge!("ws_connections_active").decrement(1.0);
    info!(session_id = %session.id, "client disconnected");

    // Let the writer flush its close frame, then cut it loose.
    if tokio::time::timeout(Duration::from_secs(5), &mut writer)
        .await
        .is_err()
    {
        writer.abort();
    }
}

/// Parse and route one inbound event; report refusals to the sender.
async fn process_event(state: &AppState, session: &Arc<SessionHandle>, text: &str) {
    let event: ClientEvent = match serde_json::from_str(text) {
        Ok(event) => event,
        Err(e) => {
            warn!(session_id = %session.id, "unparseable inbound event");
            let _ = session.send_event(&RoomEvent::Rejected {
                reason: "invalid_event".into(),
                detail: format!("invalid event: {e}"),
            });
            return;
        }
    };

    if let Err(err) = state.router.handle(session, event).await {
        debug!(session_id = %session.id, error = %err, "event refused");
        let _ = session.send_event(&RoomEvent::Rejected {
            reason: err.code().into(),
            detail: err.to_string(),
        });
    }
}
