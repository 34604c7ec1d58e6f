//! Room registry: auction ID → member set.
//!
//! Backed by `DashMap`, so locking is per-entry (sharded): unrelated
//! auctions never serialize on a common lock, and there is no global lock
//! to contend on. A room also carries the last receipt stamp handed out,
//! which is how per-room timestamp monotonicity survives wall-clock
//! wobble.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use gavel_core::{AuctionId, HubError, SessionId, now_ms};

/// One auction's live membership.
#[derive(Default)]
struct Room {
    members: HashSet<SessionId>,
    last_stamp_ms: i64,
}

/// Outcome of one fan-out pass over a room.
#[derive(Debug)]
pub struct FanOutReport {
    /// Receipt stamp assigned to the event.
    pub stamp: i64,
    /// Members whose queues accepted the event.
    pub delivered: usize,
    /// Members whose queues refused it (full or closed). The router evicts
    /// these after the pass — never mid-iteration.
    pub overflowed: Vec<SessionId>,
}

/// In-memory index of rooms and their members.
///
/// The membership side-index enforces the "at most one room per session"
/// invariant without scanning every room.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: DashMap<AuctionId, Room>,
    membership: DashMap<SessionId, AuctionId>,
}

impl RoomRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a session to a room, creating the room if absent.
    ///
    /// Fails with [`HubError::AlreadyMember`] if the session is registered
    /// in any room; the caller must leave first.
    pub fn join(&self, auction_id: &AuctionId, session_id: &SessionId) -> Result<(), HubError> {
        match self.membership.entry(session_id.clone()) {
            Entry::Occupied(_) => return Err(HubError::AlreadyMember),
            Entry::Vacant(slot) => {
                let _ = slot.insert(auction_id.clone());
            }
        }
        let mut room = self.rooms.entry(auction_id.clone()).or_default();
        let _ = room.members.insert(session_id.clone());
        Ok(())
    }

    /// Remove a session from a room. Idempotent: leaving a room you are
    /// not in is a no-op and returns `false`.
    ///
    /// An emptied room's entry is reclaimed so the registry does not grow
    /// with auction churn.
    pub fn leave(&self, auction_id: &AuctionId, session_id: &SessionId) -> bool {
        if self
            .membership
            .remove_if(session_id, |_, member_of| member_of == auction_id)
            .is_none()
        {
            return false;
        }
        let mut emptied = false;
        if let Some(mut room) = self.rooms.get_mut(auction_id) {
            let _ = room.members.remove(session_id);
            emptied = room.members.is_empty();
        }
        if emptied {
            let _ = self.rooms.remove_if(auction_id, |_, room| room.members.is_empty());
        }
        true
    }

    /// Remove a session from whatever room it is in, returning that room.
    pub fn leave_current(&self, session_id: &SessionId) -> Option<AuctionId> {
        let auction_id = self.membership.get(session_id).map(|a| a.clone())?;
        if self.leave(&auction_id, session_id) {
            Some(auction_id)
        } else {
            None
        }
    }

    /// Point-in-time snapshot of a room's members.
    ///
    /// Concurrent joins/leaves never affect an iteration over the returned
    /// set; a post-snapshot joiner simply does not receive that event.
    #[must_use]
    pub fn broadcast_targets(&self, auction_id: &AuctionId) -> Vec<SessionId> {
        self.rooms
            .get(auction_id)
            .map(|room| room.members.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Room a session currently belongs to.
    #[must_use]
    pub fn room_of(&self, session_id: &SessionId) -> Option<AuctionId> {
        self.membership.get(session_id).map(|a| a.clone())
    }

    /// Number of open rooms.
    #[must_use]
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Number of members in a room (0 if the room does not exist).
    #[must_use]
    pub fn member_count(&self, auction_id: &AuctionId) -> usize {
        self.rooms.get(auction_id).map_or(0, |room| room.members.len())
    }

    /// Stamp an event and deliver it to every member in one pass.
    ///
    /// The room's entry lock is held for the whole pass, which is what
    /// preserves per-room delivery order: two concurrently accepted events
    /// cannot interleave differently for different members. `deliver` must
    /// be non-blocking (a queue `try_send`) and must not reenter the
    /// registry.
    ///
    /// Returns `None` if the room does not exist.
    pub fn fan_out<B, D>(
        &self,
        auction_id: &AuctionId,
        exclude: Option<&SessionId>,
        build: B,
        mut deliver: D,
    ) -> Option<FanOutReport>
    where
        B: FnOnce(i64) -> Option<Arc<String>>,
        D: FnMut(&SessionId, Arc<String>) -> bool,
    {
        let mut room = self.rooms.get_mut(auction_id)?;

        let stamp = now_ms().max(room.last_stamp_ms);
        room.last_stamp_ms = stamp;

        let Some(json) = build(stamp) else {
            return Some(FanOutReport {
                stamp,
                delivered: 0,
                overflowed: Vec::new(),
            });
        };

        let mut delivered = 0;
        let mut overflowed = Vec::new();
        for member in &room.members {
            if Some(member) == exclude {
                continue;
            }
            if deliver(member, Arc::clone(&json)) {
                delivered += 1;
            } else {
                overflowed.push(member.clone());
            }
        }
        Some(FanOutReport {
            stamp,
            delivered,
            overflowed,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
