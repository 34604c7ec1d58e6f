//! Message router: validates inbound events against session/room state and
//! fans accepted events out to room members.
//!
//! One router instance serves every connection. All fan-out goes through
//! [`RoomRegistry::fan_out`], so per-room delivery order matches acceptance
//! order; members whose queues overflow are evicted after the pass
//! (backpressure rule). Chat archival is handed to the
//! [`PersistenceGateway`] without blocking delivery.

use std::sync::Arc;

use metrics::counter;
use tracing::{debug, info, warn};

use gavel_core::{
    AuctionCatalog, AuctionId, AuctionRole, BidPayload, ChatMessage, ClientEvent, HubError,
    MessageId, RoomEvent, SessionId,
};

use crate::arena::SessionArena;
use crate::persist::PersistenceGateway;
use crate::registry::{FanOutReport, RoomRegistry};
use crate::session::{SessionHandle, SessionState, encode_event};

/// Routes inbound events and owns the disconnect cleanup path.
pub struct MessageRouter {
    arena: Arc<SessionArena>,
    registry: Arc<RoomRegistry>,
    catalog: Arc<dyn AuctionCatalog>,
    gateway: Arc<PersistenceGateway>,
}

impl MessageRouter {
    /// Wire the router to its collaborators.
    #[must_use]
    pub fn new(
        arena: Arc<SessionArena>,
        registry: Arc<RoomRegistry>,
        catalog: Arc<dyn AuctionCatalog>,
        gateway: Arc<PersistenceGateway>,
    ) -> Self {
        Self {
            arena,
            registry,
            catalog,
            gateway,
        }
    }

    /// The session arena.
    #[must_use]
    pub fn arena(&self) -> &Arc<SessionArena> {
        &self.arena
    }

    /// The room registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<RoomRegistry> {
        &self.registry
    }

    /// Handle one inbound event.
    ///
    /// On `Err` the event has been dropped (not queued, not retried); the
    /// connection loop reports the refusal to the session as a `rejected`
    /// event. No error here disconnects the session.
    pub async fn handle(
        &self,
        session: &Arc<SessionHandle>,
        event: ClientEvent,
    ) -> Result<(), HubError> {
        match event {
            ClientEvent::Join { auction_id } => self.handle_join(session, auction_id).await,
            ClientEvent::Leave => self.handle_leave(session),
            ClientEvent::Chat { body } => self.handle_chat(session, body),
            ClientEvent::BidBroadcast { bid } => self.handle_bid(session, bid),
            ClientEvent::RoomClosed { auction_id } => self.handle_room_closed(session, &auction_id),
        }
    }

    async fn handle_join(
        &self,
        session: &Arc<SessionHandle>,
        auction_id: AuctionId,
    ) -> Result<(), HubError> {
        match session.state() {
            SessionState::Authenticated => {}
            SessionState::Joined(_) => return Err(HubError::AlreadyMember),
            other => {
                return Err(HubError::InvalidState {
                    state: other.name(),
                    event: "join",
                });
            }
        }

        // Synchronous authorization/existence check against the catalog
        // collaborator. A refusal leaves the session authenticated.
        self.catalog.authorize(&session.identity, &auction_id).await?;

        self.registry.join(&auction_id, &session.id)?;
        if let Err(err) = session.enter_room(auction_id.clone()) {
            // Lost a race with a concurrent transition; undo the registry
            // side so the two never disagree.
            let _ = self.registry.leave(&auction_id, &session.id);
            return Err(err);
        }

        info!(
            session_id = %session.id,
            user_id = %session.identity.user_id,
            auction_id = %auction_id,
            "participant joined room"
        );

        // Presence is observable: notify the members that were already
        // there, not the joiner.
        let user_id = session.identity.user_id.clone();
        let display_name = session.identity.display_name.clone();
        let role = session
            .identity
            .role_in(&auction_id)
            .unwrap_or(AuctionRole::Observer);
        let notify_id = auction_id.clone();
        let _ = self.fan_out_event(&auction_id, Some(&session.id), |ts| {
            RoomEvent::ParticipantJoined {
                auction_id: notify_id,
                user_id,
                display_name,
                role,
                sent_at_ms: ts,
            }
        });
        Ok(())
    }

    fn handle_leave(&self, session: &Arc<SessionHandle>) -> Result<(), HubError> {
        let auction_id = session.leave_room()?;
        let _ = self.registry.leave(&auction_id, &session.id);

        debug!(session_id = %session.id, auction_id = %auction_id, "participant left room");
        self.notify_left(&auction_id, session);
        Ok(())
    }

    fn handle_chat(&self, session: &Arc<SessionHandle>, body: String) -> Result<(), HubError> {
        let auction_id = session.require_joined("chat")?;
        let category = session
            .identity
            .role_in(&auction_id)
            .unwrap_or(AuctionRole::Observer);

        let sender_id = session.identity.user_id.clone();
        let sender_name = session.identity.display_name.clone();
        let message_auction = auction_id.clone();

        let mut archived: Option<ChatMessage> = None;
        let report = self.fan_out_event(&auction_id, None, |ts| {
            let message = ChatMessage {
                message_id: MessageId::new(),
                auction_id: message_auction,
                sender_id,
                sender_name,
                category,
                body,
                sent_at_ms: ts,
            };
            archived = Some(message.clone());
            RoomEvent::Chat(message)
        });
        if report.is_none() {
            // A joined session whose room is gone means cleanup raced us;
            // treat like any other out-of-order event.
            return Err(HubError::InvalidState {
                state: "joined",
                event: "chat",
            });
        }

        counter!("chat_messages_total").increment(1);
        if let Some(message) = archived {
            // Fire-and-forget; fan-out never waits on durability.
            let _ = self.gateway.enqueue(message);
        }
        Ok(())
    }

    fn handle_bid(&self, session: &Arc<SessionHandle>, bid: BidPayload) -> Result<(), HubError> {
        let auction_id = session.require_joined("bid_broadcast")?;

        let sender_id = session.identity.user_id.clone();
        let sender_name = session.identity.display_name.clone();
        let event_auction = auction_id.clone();

        let report = self.fan_out_event(&auction_id, None, |ts| RoomEvent::Bid {
            auction_id: event_auction,
            sender_id,
            sender_name,
            bid,
            sent_at_ms: ts,
        });
        if report.is_none() {
            return Err(HubError::InvalidState {
                state: "joined",
                event: "bid_broadcast",
            });
        }

        counter!("bid_broadcasts_total").increment(1);
        Ok(())
    }

    fn handle_room_closed(
        &self,
        session: &Arc<SessionHandle>,
        auction_id: &AuctionId,
    ) -> Result<(), HubError> {
        // Over the wire, only the auction's seller may close its room; the
        // close scheduler calls `close_room` directly.
        if session.identity.role_in(auction_id) != Some(AuctionRole::Seller) {
            return Err(HubError::ForbiddenAuction(auction_id.clone()));
        }
        self.close_room(auction_id);
        Ok(())
    }

    /// Close a room: notify members, then evict every one of them.
    ///
    /// Also the entry point for the external auction-close scheduler.
    pub fn close_room(&self, auction_id: &AuctionId) {
        let closing = auction_id.clone();
        let _ = self.fan_out_event(auction_id, None, |_ts| RoomEvent::RoomClosed {
            auction_id: closing,
        });

        let members = self.registry.broadcast_targets(auction_id);
        info!(auction_id = %auction_id, members = members.len(), "closing room");
        for session_id in members {
            self.evict(&session_id, "room closed");
        }
    }

    /// Forcibly disconnect a session by ID.
    pub fn evict(&self, session_id: &SessionId, reason: &str) {
        if let Some(session) = self.arena.get(session_id) {
            warn!(session_id = %session_id, reason, "evicting session");
            self.disconnect(&session);
        }
    }

    /// Disconnect cleanup, guaranteed to run exactly once per session.
    ///
    /// Safe to call from every disconnect signal (socket close, heartbeat
    /// timeout, backpressure eviction, room close); only the first caller
    /// does the work: leave the room, tell the remaining members, drop the
    /// arena entry.
    pub fn disconnect(&self, session: &Arc<SessionHandle>) {
        if !session.begin_disconnect() {
            return;
        }
        if let Some(auction_id) = self.registry.leave_current(&session.id) {
            self.notify_left(&auction_id, session);
        }
        let _ = self.arena.remove(&session.id);
        debug!(session_id = %session.id, "session cleaned up");
    }

    fn notify_left(&self, auction_id: &AuctionId, session: &Arc<SessionHandle>) {
        let event_auction = auction_id.clone();
        let user_id = session.identity.user_id.clone();
        let display_name = session.identity.display_name.clone();
        let _ = self.fan_out_event(auction_id, None, |ts| RoomEvent::ParticipantLeft {
            auction_id: event_auction,
            user_id,
            display_name,
            sent_at_ms: ts,
        });
    }

    /// Stamp, serialize once, and deliver to the room; evict members whose
    /// queues overflowed, after the pass.
    fn fan_out_event<F>(
        &self,
        auction_id: &AuctionId,
        exclude: Option<&SessionId>,
        build_event: F,
    ) -> Option<FanOutReport>
    where
        F: FnOnce(i64) -> RoomEvent,
    {
        let report = self.registry.fan_out(
            auction_id,
            exclude,
            |ts| encode_event(&build_event(ts)),
            |session_id, json| {
                self.arena
                    .get(session_id)
                    .is_some_and(|member| member.send_raw(json))
            },
        )?;

        for session_id in &report.overflowed {
            counter!("ws_backpressure_evictions_total").increment(1);
            self.evict(session_id, "send queue overflow");
        }
        Some(report)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use tokio::sync::mpsc;

    use gavel_core::{AlertSink, ChatStore, Identity, RetryConfig, StorageError, UserId};

    /// Catalog fake mirroring the claims-backed deployment shape.
    struct EntitlementCatalog;

    #[async_trait]
    impl AuctionCatalog for EntitlementCatalog {
        async fn authorize(
            &self,
            identity: &Identity,
            auction_id: &AuctionId,
        ) -> Result<(), HubError> {
            if identity.role_in(auction_id).is_some() {
                Ok(())
            } else {
                Err(HubError::ForbiddenAuction(auction_id.clone()))
            }
        }
    }

    /// In-memory archive recording message IDs and bodies in arrival order.
    #[derive(Default)]
    struct MemoryStore {
        rows: Mutex<Vec<ChatMessage>>,
        seen: Mutex<HashSet<String>>,
    }

    #[async_trait]
    impl ChatStore for MemoryStore {
        async fn persist(&self, message: &ChatMessage) -> Result<(), StorageError> {
            if self.seen.lock().insert(message.message_id.as_str().to_owned()) {
                self.rows.lock().push(message.clone());
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct NullAlerts;

    impl AlertSink for NullAlerts {
        fn chat_archive_failed(&self, _m: &ChatMessage, _a: u32, _e: &StorageError) {}
    }

    struct Harness {
        router: Arc<MessageRouter>,
        store: Arc<MemoryStore>,
        gateway: Arc<PersistenceGateway>,
    }

    fn harness() -> Harness {
        let arena = Arc::new(SessionArena::new());
        let registry = Arc::new(RoomRegistry::new());
        let store = Arc::new(MemoryStore::default());
        let gateway = Arc::new(PersistenceGateway::spawn(
            store.clone(),
            Arc::new(NullAlerts),
            RetryConfig::default(),
            256,
        ));
        let router = Arc::new(MessageRouter::new(
            arena,
            registry,
            Arc::new(EntitlementCatalog),
            gateway.clone(),
        ));
        Harness {
            router,
            store,
            gateway,
        }
    }

    fn identity(user: &str, auctions: &[(&str, AuctionRole)]) -> Identity {
        Identity {
            user_id: UserId::from(user),
            display_name: user.to_uppercase(),
            entitlements: auctions
                .iter()
                .map(|(id, role)| (AuctionId::from(*id), *role))
                .collect(),
        }
    }

    /// Connect a session (authenticated, registered in the arena).
    fn connect(
        harness: &Harness,
        identity: Identity,
        capacity: usize,
    ) -> (Arc<SessionHandle>, mpsc::Receiver<Arc<String>>) {
        let (session, rx) = SessionHandle::new(identity, capacity);
        session.mark_authenticated().unwrap();
        harness.router.arena().insert(session.clone());
        (session, rx)
    }

    fn drain(rx: &mut mpsc::Receiver<Arc<String>>) -> Vec<serde_json::Value> {
        let mut events = Vec::new();
        while let Ok(json) = rx.try_recv() {
            events.push(serde_json::from_str(&json).unwrap());
        }
        events
    }

    async fn join(harness: &Harness, session: &Arc<SessionHandle>, auction: &str) {
        harness
            .router
            .handle(
                session,
                ClientEvent::Join {
                    auction_id: AuctionId::from(auction),
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn join_notifies_existing_members_not_joiner() {
        let h = harness();
        let (alice, mut alice_rx) = connect(&h, identity("alice", &[("A1", AuctionRole::Bidder)]), 32);
        let (bob, mut bob_rx) = connect(&h, identity("bob", &[("A1", AuctionRole::Bidder)]), 32);

        join(&h, &alice, "A1").await;
        assert!(drain(&mut alice_rx).is_empty());

        join(&h, &bob, "A1").await;
        let alice_events = drain(&mut alice_rx);
        assert_eq!(alice_events.len(), 1);
        assert_eq!(alice_events[0]["type"], "participant_joined");
        assert_eq!(alice_events[0]["user_id"], "bob");
        assert!(drain(&mut bob_rx).is_empty());
    }

    #[tokio::test]
    async fn forbidden_join_leaves_session_authenticated_and_room_silent() {
        let h = harness();
        let (alice, mut alice_rx) = connect(&h, identity("alice", &[("A1", AuctionRole::Bidder)]), 32);
        join(&h, &alice, "A1").await;

        let (carol, _carol_rx) = connect(&h, identity("carol", &[("A9", AuctionRole::Bidder)]), 32);
        let result = h
            .router
            .handle(
                &carol,
                ClientEvent::Join {
                    auction_id: AuctionId::from("A1"),
                },
            )
            .await;
        assert!(matches!(result, Err(HubError::ForbiddenAuction(_))));
        assert_eq!(carol.state(), SessionState::Authenticated);
        assert!(drain(&mut alice_rx).is_empty());
    }

    #[tokio::test]
    async fn chat_reaches_members_and_is_archived_once() {
        let h = harness();
        let (alice, mut alice_rx) = connect(&h, identity("alice", &[("A1", AuctionRole::Bidder)]), 32);
        let (bob, mut bob_rx) = connect(&h, identity("bob", &[("A1", AuctionRole::Observer)]), 32);
        join(&h, &alice, "A1").await;
        join(&h, &bob, "A1").await;
        let _ = drain(&mut alice_rx);

        h.router
            .handle(
                &alice,
                ClientEvent::Chat {
                    body: "hello".into(),
                },
            )
            .await
            .unwrap();

        let bob_events = drain(&mut bob_rx);
        assert_eq!(bob_events.len(), 1, "bob sees exactly the chat, no presence echo");
        assert_eq!(bob_events[0]["type"], "chat");
        assert_eq!(bob_events[0]["sender_id"], "alice");
        assert_eq!(bob_events[0]["body"], "hello");
        assert_eq!(bob_events[0]["category"], "bidder");

        h.gateway.close().await;
        let rows = h.store.rows.lock();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].auction_id, AuctionId::from("A1"));
        assert_eq!(rows[0].body, "hello");
    }

    #[tokio::test]
    async fn chat_outside_room_is_invalid_state_and_dropped() {
        let h = harness();
        let (alice, mut alice_rx) = connect(&h, identity("alice", &[("A1", AuctionRole::Bidder)]), 32);
        join(&h, &alice, "A1").await;

        let (bob, _bob_rx) = connect(&h, identity("bob", &[("A1", AuctionRole::Bidder)]), 32);
        let result = h
            .router
            .handle(&bob, ClientEvent::Chat { body: "early".into() })
            .await;
        assert!(matches!(
            result,
            Err(HubError::InvalidState {
                state: "authenticated",
                event: "chat"
            })
        ));

        // nothing was fanned out
        assert!(drain(&mut alice_rx).is_empty());
        h.gateway.close().await;
        assert!(h.store.rows.lock().is_empty());
    }

    #[tokio::test]
    async fn second_join_is_already_member() {
        let h = harness();
        let (alice, _rx) = connect(
            &h,
            identity("alice", &[("A1", AuctionRole::Bidder), ("A2", AuctionRole::Bidder)]),
            32,
        );
        join(&h, &alice, "A1").await;

        let result = h
            .router
            .handle(
                &alice,
                ClientEvent::Join {
                    auction_id: AuctionId::from("A2"),
                },
            )
            .await;
        assert!(matches!(result, Err(HubError::AlreadyMember)));
        // still connected and still in A1
        assert!(!alice.is_disconnected());
        assert_eq!(alice.current_room(), Some(AuctionId::from("A1")));
    }

    #[tokio::test]
    async fn leave_notifies_remaining_and_reclaims_empty_room() {
        let h = harness();
        let (alice, mut alice_rx) = connect(&h, identity("alice", &[("A1", AuctionRole::Bidder)]), 32);
        let (bob, _bob_rx) = connect(&h, identity("bob", &[("A1", AuctionRole::Bidder)]), 32);
        join(&h, &alice, "A1").await;
        join(&h, &bob, "A1").await;
        let _ = drain(&mut alice_rx);

        h.router.handle(&bob, ClientEvent::Leave).await.unwrap();
        let alice_events = drain(&mut alice_rx);
        assert_eq!(alice_events.len(), 1);
        assert_eq!(alice_events[0]["type"], "participant_left");
        assert_eq!(alice_events[0]["user_id"], "bob");
        assert_eq!(bob.state(), SessionState::Authenticated);

        h.router.handle(&alice, ClientEvent::Leave).await.unwrap();
        assert_eq!(h.router.registry().room_count(), 0);
    }

    #[tokio::test]
    async fn rejoin_after_leave_works() {
        let h = harness();
        let (alice, _rx) = connect(&h, identity("alice", &[("A1", AuctionRole::Bidder)]), 32);
        join(&h, &alice, "A1").await;
        h.router.handle(&alice, ClientEvent::Leave).await.unwrap();
        join(&h, &alice, "A1").await;
        assert_eq!(alice.current_room(), Some(AuctionId::from("A1")));
    }

    #[tokio::test]
    async fn bid_broadcast_fans_out_without_persistence() {
        let h = harness();
        let (alice, _alice_rx) = connect(&h, identity("alice", &[("A1", AuctionRole::Bidder)]), 32);
        let (bob, mut bob_rx) = connect(&h, identity("bob", &[("A1", AuctionRole::Observer)]), 32);
        join(&h, &alice, "A1").await;
        join(&h, &bob, "A1").await;

        h.router
            .handle(
                &alice,
                ClientEvent::BidBroadcast {
                    bid: BidPayload(serde_json::json!({"amount": 500})),
                },
            )
            .await
            .unwrap();

        let bob_events = drain(&mut bob_rx);
        assert_eq!(bob_events.len(), 1);
        assert_eq!(bob_events[0]["type"], "bid");
        assert_eq!(bob_events[0]["bid"]["amount"], 500);

        h.gateway.close().await;
        assert!(h.store.rows.lock().is_empty());
    }

    #[tokio::test]
    async fn room_events_are_delivered_in_acceptance_order() {
        let h = harness();
        let (alice, _alice_rx) = connect(&h, identity("alice", &[("A1", AuctionRole::Bidder)]), 256);
        let (bob, mut bob_rx) = connect(&h, identity("bob", &[("A1", AuctionRole::Observer)]), 256);
        join(&h, &alice, "A1").await;
        join(&h, &bob, "A1").await;

        for n in 0..100 {
            h.router
                .handle(
                    &alice,
                    ClientEvent::Chat {
                        body: format!("msg {n}"),
                    },
                )
                .await
                .unwrap();
        }

        let bob_events = drain(&mut bob_rx);
        assert_eq!(bob_events.len(), 100);
        for (n, event) in bob_events.iter().enumerate() {
            assert_eq!(event["body"], format!("msg {n}"));
        }
        let stamps: Vec<i64> = bob_events
            .iter()
            .map(|e| e["sent_at_ms"].as_i64().unwrap())
            .collect();
        assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn slow_member_is_evicted_others_get_all_1000_in_order() {
        let h = harness();
        let (alice, _alice_rx) =
            connect(&h, identity("alice", &[("A1", AuctionRole::Bidder)]), 2048);
        let (bob, mut bob_rx) =
            connect(&h, identity("bob", &[("A1", AuctionRole::Observer)]), 2048);
        // slow consumer: tiny queue, never drained
        let (slow, _slow_rx) = connect(&h, identity("slow", &[("A1", AuctionRole::Observer)]), 4);
        join(&h, &alice, "A1").await;
        join(&h, &bob, "A1").await;
        join(&h, &slow, "A1").await;
        let _ = drain(&mut bob_rx);

        for n in 0..1000 {
            h.router
                .handle(
                    &alice,
                    ClientEvent::Chat {
                        body: format!("msg {n}"),
                    },
                )
                .await
                .unwrap();
        }

        // the slow member overflowed its queue and was evicted
        assert!(slow.is_disconnected());
        assert!(h.router.arena().get(&slow.id).is_none());
        assert_eq!(h.router.registry().member_count(&AuctionId::from("A1")), 2);

        // bob got every chat in order, plus one participant_left for slow
        let bob_events = drain(&mut bob_rx);
        let chats: Vec<&serde_json::Value> = bob_events
            .iter()
            .filter(|e| e["type"] == "chat")
            .collect();
        assert_eq!(chats.len(), 1000);
        for (n, event) in chats.iter().enumerate() {
            assert_eq!(event["body"], format!("msg {n}"));
        }
        let departures = bob_events
            .iter()
            .filter(|e| e["type"] == "participant_left" && e["user_id"] == "slow")
            .count();
        assert_eq!(departures, 1);
    }

    #[tokio::test]
    async fn disconnect_cleanup_runs_exactly_once() {
        let h = harness();
        let (alice, mut alice_rx) = connect(&h, identity("alice", &[("A1", AuctionRole::Bidder)]), 32);
        let (bob, _bob_rx) = connect(&h, identity("bob", &[("A1", AuctionRole::Bidder)]), 32);
        join(&h, &alice, "A1").await;
        join(&h, &bob, "A1").await;
        let _ = drain(&mut alice_rx);

        // disconnect signalled from two paths (socket close + idle timeout)
        h.router.disconnect(&bob);
        h.router.disconnect(&bob);

        let alice_events = drain(&mut alice_rx);
        let departures: Vec<&serde_json::Value> = alice_events
            .iter()
            .filter(|e| e["type"] == "participant_left")
            .collect();
        assert_eq!(departures.len(), 1);
        assert!(h.router.arena().get(&bob.id).is_none());
    }

    #[tokio::test]
    async fn seller_closes_room_everyone_evicted() {
        let h = harness();
        let (seller, _seller_rx) = connect(&h, identity("seller", &[("A1", AuctionRole::Seller)]), 32);
        let (bob, mut bob_rx) = connect(&h, identity("bob", &[("A1", AuctionRole::Bidder)]), 32);
        join(&h, &seller, "A1").await;
        join(&h, &bob, "A1").await;

        h.router
            .handle(
                &seller,
                ClientEvent::RoomClosed {
                    auction_id: AuctionId::from("A1"),
                },
            )
            .await
            .unwrap();

        let bob_events = drain(&mut bob_rx);
        assert!(bob_events.iter().any(|e| e["type"] == "room_closed"));
        assert!(bob.is_disconnected());
        assert!(seller.is_disconnected());
        assert_eq!(h.router.registry().room_count(), 0);
        assert!(h.router.arena().is_empty());
    }

    #[tokio::test]
    async fn non_seller_cannot_close_room() {
        let h = harness();
        let (alice, _rx) = connect(&h, identity("alice", &[("A1", AuctionRole::Bidder)]), 32);
        join(&h, &alice, "A1").await;

        let result = h
            .router
            .handle(
                &alice,
                ClientEvent::RoomClosed {
                    auction_id: AuctionId::from("A1"),
                },
            )
            .await;
        assert!(matches!(result, Err(HubError::ForbiddenAuction(_))));
        assert!(!alice.is_disconnected());
        assert_eq!(h.router.registry().room_count(), 1);
    }

    #[tokio::test]
    async fn sender_disconnect_does_not_cancel_archival() {
        let h = harness();
        let (alice, _alice_rx) = connect(&h, identity("alice", &[("A1", AuctionRole::Bidder)]), 32);
        join(&h, &alice, "A1").await;

        h.router
            .handle(&alice, ClientEvent::Chat { body: "last words".into() })
            .await
            .unwrap();
        h.router.disconnect(&alice);

        h.gateway.close().await;
        let rows = h.store.rows.lock();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].body, "last words");
    }

    #[tokio::test]
    async fn failure_in_one_session_does_not_affect_another() {
        let h = harness();
        let (alice, _alice_rx) = connect(&h, identity("alice", &[("A1", AuctionRole::Bidder)]), 32);
        let (bob, mut bob_rx) = connect(&h, identity("bob", &[("A1", AuctionRole::Bidder)]), 32);
        join(&h, &alice, "A1").await;
        join(&h, &bob, "A1").await;

        // bob misuses the protocol repeatedly
        for _ in 0..3 {
            let result = h
                .router
                .handle(
                    &bob,
                    ClientEvent::Join {
                        auction_id: AuctionId::from("A1"),
                    },
                )
                .await;
            assert!(matches!(result, Err(HubError::AlreadyMember)));
        }

        // alice's session is untouched and chat still flows to bob
        assert_eq!(alice.current_room(), Some(AuctionId::from("A1")));
        let _ = drain(&mut bob_rx);
        h.router
            .handle(&alice, ClientEvent::Chat { body: "still here".into() })
            .await
            .unwrap();
        let bob_events = drain(&mut bob_rx);
        assert_eq!(bob_events.len(), 1);
        assert_eq!(bob_events[0]["body"], "still here");
    }
}
