//! One live connection: identity, state machine, outbound queue.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use gavel_core::{AuctionId, HubError, Identity, RoomEvent, SessionId};

/// Lifecycle states of a connection session.
///
/// `Connecting → Authenticated → Joined → Disconnected`, with `Joined →
/// Authenticated` on leave. `Disconnected` is terminal and reachable from
/// every state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Socket accepted, credential not yet confirmed against the session.
    Connecting,
    /// Credential validated; not in any room.
    Authenticated,
    /// Member of exactly one room.
    Joined(AuctionId),
    /// Terminal. The connection is gone or going.
    Disconnected,
}

impl SessionState {
    /// State name used in errors and logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Authenticated => "authenticated",
            Self::Joined(_) => "joined",
            Self::Disconnected => "disconnected",
        }
    }
}

/// Serialize an outbound event once for fan-out.
///
/// Returns `None` (with a warning) if serialization fails; callers skip
/// delivery rather than tearing anything down.
#[must_use]
pub fn encode_event(event: &RoomEvent) -> Option<Arc<String>> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Arc::new(json)),
        Err(e) => {
            warn!(error = %e, "failed to serialize outbound event");
            None
        }
    }
}

/// A live, exclusively hub-owned connection session.
///
/// Everything mutable is behind short `parking_lot` critical sections or
/// atomics; the handle itself is shared as `Arc` between the socket tasks,
/// the arena, and the router.
pub struct SessionHandle {
    /// Unique session ID, assigned at connect.
    pub id: SessionId,
    /// Immutable identity from the validated credential.
    pub identity: Identity,
    /// When the connection was established.
    pub connected_at: Instant,
    state: Mutex<SessionState>,
    tx: mpsc::Sender<Arc<String>>,
    cancel: CancellationToken,
    cleanup_started: AtomicBool,
    is_alive: AtomicBool,
    dropped_events: AtomicU64,
}

impl SessionHandle {
    /// Create a session in `Connecting` with a bounded outbound queue.
    ///
    /// Returns the handle and the receiver half the connection's writer
    /// task drains.
    #[must_use]
    pub fn new(
        identity: Identity,
        queue_capacity: usize,
    ) -> (Arc<Self>, mpsc::Receiver<Arc<String>>) {
        let (tx, rx) = mpsc::channel(queue_capacity);
        let handle = Arc::new(Self {
            id: SessionId::new(),
            identity,
            connected_at: Instant::now(),
            state: Mutex::new(SessionState::Connecting),
            tx,
            cancel: CancellationToken::new(),
            cleanup_started: AtomicBool::new(false),
            is_alive: AtomicBool::new(true),
            dropped_events: AtomicU64::new(0),
        });
        (handle, rx)
    }

    /// Current state (cloned snapshot).
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.lock().clone()
    }

    /// Current state name for errors and logs.
    #[must_use]
    pub fn state_name(&self) -> &'static str {
        self.state.lock().name()
    }

    /// Room this session currently belongs to, if any.
    #[must_use]
    pub fn current_room(&self) -> Option<AuctionId> {
        match &*self.state.lock() {
            SessionState::Joined(auction_id) => Some(auction_id.clone()),
            _ => None,
        }
    }

    /// `Connecting → Authenticated`, after the validator accepted the
    /// credential.
    pub fn mark_authenticated(&self) -> Result<(), HubError> {
        let mut state = self.state.lock();
        match &*state {
            SessionState::Connecting => {
                *state = SessionState::Authenticated;
                Ok(())
            }
            other => Err(HubError::InvalidState {
                state: other.name(),
                event: "authenticate",
            }),
        }
    }

    /// `Authenticated → Joined`. A joined session gets `AlreadyMember`;
    /// any other state gets `InvalidState`.
    pub fn enter_room(&self, auction_id: AuctionId) -> Result<(), HubError> {
        let mut state = self.state.lock();
        match &*state {
            SessionState::Authenticated => {
                *state = SessionState::Joined(auction_id);
                Ok(())
            }
            SessionState::Joined(_) => Err(HubError::AlreadyMember),
            other => Err(HubError::InvalidState {
                state: other.name(),
                event: "join",
            }),
        }
    }

    /// `Joined → Authenticated`; returns the room that was left.
    pub fn leave_room(&self) -> Result<AuctionId, HubError> {
        let mut state = self.state.lock();
        match state.clone() {
            SessionState::Joined(auction_id) => {
                *state = SessionState::Authenticated;
                Ok(auction_id)
            }
            other => Err(HubError::InvalidState {
                state: other.name(),
                event: "leave",
            }),
        }
    }

    /// The room this session is joined to, or `InvalidState` for `event`.
    pub fn require_joined(&self, event: &'static str) -> Result<AuctionId, HubError> {
        match &*self.state.lock() {
            SessionState::Joined(auction_id) => Ok(auction_id.clone()),
            other => Err(HubError::InvalidState {
                state: other.name(),
                event,
            }),
        }
    }

    /// Enqueue a pre-serialized event.
    ///
    /// Non-blocking. `false` means the queue is full or the connection is
    /// gone; the caller decides whether that is an eviction (backpressure)
    /// or ignorable (already disconnecting).
    pub fn send_raw(&self, json: Arc<String>) -> bool {
        if self.tx.try_send(json).is_ok() {
            true
        } else {
            let _ = self.dropped_events.fetch_add(1, Ordering::Relaxed);
            false
        }
    }

    /// Serialize and enqueue a single event (non-fan-out path).
    pub fn send_event(&self, event: &RoomEvent) -> bool {
        encode_event(event).is_some_and(|json| self.send_raw(json))
    }

    /// Events dropped against this session's queue.
    #[must_use]
    pub fn drop_count(&self) -> u64 {
        self.dropped_events.load(Ordering::Relaxed)
    }

    /// Begin disconnect exactly once.
    ///
    /// Moves the state to `Disconnected` and cancels the socket tasks.
    /// Returns `true` only for the first caller. Disconnect can be
    /// signalled from several paths (socket close, heartbeat timeout,
    /// backpressure eviction, room close) and cleanup must run once.
    pub fn begin_disconnect(&self) -> bool {
        if self.cleanup_started.swap(true, Ordering::SeqCst) {
            return false;
        }
        *self.state.lock() = SessionState::Disconnected;
        self.cancel.cancel();
        true
    }

    /// Token cancelled when the session disconnects.
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Whether disconnect has been signalled.
    #[must_use]
    pub fn is_disconnected(&self) -> bool {
        self.cleanup_started.load(Ordering::SeqCst)
    }

    /// Record liveness (any pong or inbound traffic).
    pub fn mark_alive(&self) {
        self.is_alive.store(true, Ordering::Relaxed);
    }

    /// Check and reset the liveness flag (heartbeat tick).
    pub fn check_alive(&self) -> bool {
        self.is_alive.swap(false, Ordering::Relaxed)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
