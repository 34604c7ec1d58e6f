//! Process-wide index of live sessions.
//!
//! Rooms reference sessions by ID only; this arena is the single place an
//! ID resolves to a live handle. One instance is created at startup and
//! torn down at shutdown; there is no ambient static state.

use std::sync::Arc;

use dashmap::DashMap;

use gavel_core::SessionId;

use crate::session::SessionHandle;

/// Arena of live sessions, keyed by session ID.
#[derive(Default)]
pub struct SessionArena {
    sessions: DashMap<SessionId, Arc<SessionHandle>>,
}

impl SessionArena {
    /// Create an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session. IDs are generated, so collisions do not occur;
    /// an existing entry under the same ID would be replaced.
    pub fn insert(&self, session: Arc<SessionHandle>) {
        let _ = self.sessions.insert(session.id.clone(), session);
    }

    /// Resolve an ID to a live handle.
    #[must_use]
    pub fn get(&self, session_id: &SessionId) -> Option<Arc<SessionHandle>> {
        self.sessions.get(session_id).map(|s| s.clone())
    }

    /// Remove a session, returning its handle if it was present.
    pub fn remove(&self, session_id: &SessionId) -> Option<Arc<SessionHandle>> {
        self.sessions.remove(session_id).map(|(_, s)| s)
    }

    /// Number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the arena is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Snapshot of all live session handles (heartbeat sweep).
    #[must_use]
    pub fn snapshot(&self) -> Vec<Arc<SessionHandle>> {
        self.sessions.iter().map(|e| e.value().clone()).collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
