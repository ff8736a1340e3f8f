//! Room membership and fan-out.
//!
//! [`RoomRouter`] maps an interview id to the set of connections currently
//! in that room, each represented by its [`Outbox`]. Broadcasting pushes a
//! [`RelayedEvent`] into every other member's outbox; each connection's
//! write loop drains its own outbox in FIFO order, so events from a single
//! sender reach every receiver in emission order.
//!
//! Outboxes are bounded. A member whose outbox is full is lagging (its
//! socket is not being read); events for it are dropped until it drains.

use std::collections::{HashMap, VecDeque};

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{RwLock, mpsc};

use super::ConnectionId;
use super::relay_event::{RelayedEvent, ServerEvent};
use crate::error::RelayError;

/// Sending half of a connection's bounded outbound queue.
pub type Outbox = mpsc::Sender<RelayedEvent>;

/// One interview room.
#[derive(Debug, Default)]
struct Room {
    members: HashMap<ConnectionId, Outbox>,
    /// Last sequence number handed out in this room.
    last_seq: u64,
    /// Recent relayed events, oldest first. Empty when replay is disabled.
    history: VecDeque<RelayedEvent>,
}

#[derive(Debug, Default)]
struct RouterState {
    rooms: HashMap<String, Room>,
    /// Reverse index: which room each connection is in.
    membership: HashMap<ConnectionId, String>,
}

/// Result of a successful [`RoomRouter::join`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinReceipt {
    /// Room the connection was in before, if it switched rooms.
    pub previous_room: Option<String>,
    /// Number of buffered events replayed into the joining outbox.
    pub replayed: usize,
}

/// Active room count and size, for monitoring endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomOccupancy {
    /// Interview id naming the room.
    pub interview_id: String,
    /// Connections currently in the room.
    pub participants: usize,
}

/// Explicit room table, independent of the transport.
///
/// # Invariants
///
/// - A connection is a member of at most one room.
/// - Rooms with no members are removed, along with their replay buffer.
#[derive(Debug)]
pub struct RoomRouter {
    state: RwLock<RouterState>,
    /// Maximum members per room; `0` means unlimited.
    max_participants: usize,
    /// Events kept per room for late joiners; `0` disables replay.
    replay_capacity: usize,
}

impl RoomRouter {
    /// Creates a router with the given per-room limits.
    ///
    /// `max_participants == 0` leaves rooms unbounded and
    /// `replay_capacity == 0` disables the replay buffer.
    #[must_use]
    pub fn new(max_participants: usize, replay_capacity: usize) -> Self {
        Self {
            state: RwLock::new(RouterState::default()),
            max_participants,
            replay_capacity,
        }
    }

    /// Adds `connection_id` to the room `interview_id`.
    ///
    /// If the connection is already in another room it leaves that room
    /// first. Rejoining the same room only refreshes the outbox. When replay
    /// is enabled the room's buffered events are pushed into `outbox` before
    /// this returns, so they precede any live event.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::RoomFull`] if the room already holds
    /// `max_participants` other connections. The connection's existing
    /// membership is left untouched in that case.
    pub async fn join(
        &self,
        connection_id: ConnectionId,
        interview_id: &str,
        outbox: Outbox,
    ) -> Result<JoinReceipt, RelayError> {
        let mut state = self.state.write().await;

        if let Some(room) = state.rooms.get_mut(interview_id)
            && room.members.contains_key(&connection_id)
        {
            room.members.insert(connection_id, outbox);
            return Ok(JoinReceipt {
                previous_room: None,
                replayed: 0,
            });
        }

        let occupied = state
            .rooms
            .get(interview_id)
            .map_or(0, |room| room.members.len());
        if self.max_participants > 0 && occupied >= self.max_participants {
            return Err(RelayError::RoomFull {
                interview_id: interview_id.to_string(),
                capacity: self.max_participants,
            });
        }

        let previous_room = detach(&mut state, connection_id);

        let room = state.rooms.entry(interview_id.to_string()).or_default();
        let mut replayed = 0;
        for event in &room.history {
            if outbox.try_send(event.clone()).is_err() {
                tracing::warn!(connection = %connection_id, interview_id, "outbox full during replay");
                break;
            }
            replayed += 1;
        }
        room.members.insert(connection_id, outbox);
        state
            .membership
            .insert(connection_id, interview_id.to_string());

        Ok(JoinReceipt {
            previous_room,
            replayed,
        })
    }

    /// Removes `connection_id` from whatever room it is in.
    ///
    /// Returns the room it left, or `None` if it was not in any room.
    pub async fn leave(&self, connection_id: ConnectionId) -> Option<String> {
        let mut state = self.state.write().await;
        detach(&mut state, connection_id)
    }

    /// Delivers `event` to every member of `interview_id` except `sender`.
    ///
    /// Fire-and-forget: returns the number of outboxes the event was pushed
    /// into. Full or closed outboxes are skipped. A missing room drops the
    /// event; nothing is buffered unless the room exists and replay is
    /// enabled.
    pub async fn broadcast(
        &self,
        sender: ConnectionId,
        interview_id: &str,
        event: &ServerEvent,
    ) -> usize {
        let mut state = self.state.write().await;
        let Some(room) = state.rooms.get_mut(interview_id) else {
            return 0;
        };

        room.last_seq = room.last_seq.saturating_add(1);
        let relayed = RelayedEvent::sequenced(event, room.last_seq);

        let mut delivered = 0;
        for (member, outbox) in &room.members {
            if *member == sender {
                continue;
            }
            match outbox.try_send(relayed.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(
                        connection = %member,
                        interview_id,
                        event = relayed.event,
                        "connection lagging, outbox full, event dropped"
                    );
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::warn!(connection = %member, interview_id, "outbox closed, event dropped");
                }
            }
        }

        if self.replay_capacity > 0 && !event.is_presence() {
            if room.history.len() >= self.replay_capacity {
                room.history.pop_front();
            }
            room.history.push_back(relayed);
        }

        delivered
    }

    /// Returns the room `connection_id` is currently in.
    pub async fn room_of(&self, connection_id: ConnectionId) -> Option<String> {
        self.state
            .read()
            .await
            .membership
            .get(&connection_id)
            .cloned()
    }

    /// Returns the connections currently in `interview_id`.
    pub async fn members(&self, interview_id: &str) -> Vec<ConnectionId> {
        self.state
            .read()
            .await
            .rooms
            .get(interview_id)
            .map(|room| room.members.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Returns the occupancy of every active room, sorted by interview id.
    pub async fn occupancy(&self) -> Vec<RoomOccupancy> {
        let state = self.state.read().await;
        let mut rooms: Vec<RoomOccupancy> = state
            .rooms
            .iter()
            .map(|(id, room)| RoomOccupancy {
                interview_id: id.clone(),
                participants: room.members.len(),
            })
            .collect();
        rooms.sort_by(|a, b| a.interview_id.cmp(&b.interview_id));
        rooms
    }

    /// Returns the number of active rooms.
    pub async fn room_count(&self) -> usize {
        self.state.read().await.rooms.len()
    }
}

impl Default for RoomRouter {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

/// Removes `connection_id` from its room, dropping the room if it empties.
fn detach(state: &mut RouterState, connection_id: ConnectionId) -> Option<String> {
    let interview_id = state.membership.remove(&connection_id)?;
    if let Some(room) = state.rooms.get_mut(&interview_id) {
        room.members.remove(&connection_id);
        if room.members.is_empty() {
            state.rooms.remove(&interview_id);
        }
    }
    Some(interview_id)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::Receiver;

    fn outbox() -> (Outbox, Receiver<RelayedEvent>) {
        mpsc::channel(16)
    }

    fn offer(sdp: &str) -> ServerEvent {
        ServerEvent::Offer(serde_json::json!({ "sdp": sdp }))
    }

    async fn joined(
        router: &RoomRouter,
        interview_id: &str,
    ) -> (ConnectionId, Receiver<RelayedEvent>) {
        let id = ConnectionId::new();
        let (tx, rx) = outbox();
        let Ok(_) = router.join(id, interview_id, tx).await else {
            panic!("join should succeed");
        };
        (id, rx)
    }

    #[tokio::test]
    async fn broadcast_skips_sender_and_reaches_peers() {
        let router = RoomRouter::default();
        let (a, mut rx_a) = joined(&router, "I1").await;
        let (_b, mut rx_b) = joined(&router, "I1").await;
        let (_c, mut rx_c) = joined(&router, "I1").await;

        let delivered = router.broadcast(a, "I1", &offer("X")).await;
        assert_eq!(delivered, 2);

        for rx in [&mut rx_b, &mut rx_c] {
            let Ok(event) = rx.try_recv() else {
                panic!("peer should receive the offer");
            };
            assert_eq!(event.event, "offer");
            assert_eq!(event.data, serde_json::json!({ "sdp": "X" }));
        }
        assert!(rx_a.try_recv().is_err());
    }

    #[tokio::test]
    async fn broadcast_stays_inside_room() {
        let router = RoomRouter::default();
        let (a, _rx_a) = joined(&router, "I1").await;
        let (_b, mut rx_b) = joined(&router, "I2").await;

        let delivered = router
            .broadcast(a, "I1", &ServerEvent::IceCandidate(serde_json::json!({})))
            .await;
        assert_eq!(delivered, 0);
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn broadcast_to_missing_room_is_dropped() {
        let router = RoomRouter::default();
        assert_eq!(router.broadcast(ConnectionId::new(), "nowhere", &offer("X")).await, 0);
        assert_eq!(router.room_count().await, 0);
    }

    #[tokio::test]
    async fn per_sender_order_is_preserved() {
        let router = RoomRouter::default();
        let (a, _rx_a) = joined(&router, "I1").await;
        let (_b, mut rx_b) = joined(&router, "I1").await;

        for i in 0..5 {
            let _ = router.broadcast(a, "I1", &offer(&i.to_string())).await;
        }
        for i in 0..5 {
            let Ok(event) = rx_b.try_recv() else {
                panic!("missing event {i}");
            };
            assert_eq!(event.data, serde_json::json!({ "sdp": i.to_string() }));
            assert_eq!(event.seq, Some(i + 1));
        }
    }

    #[tokio::test]
    async fn joining_another_room_leaves_the_first() {
        let router = RoomRouter::default();
        let a = ConnectionId::new();
        let (tx, _rx) = outbox();
        let _ = router.join(a, "I1", tx.clone()).await;

        let Ok(receipt) = router.join(a, "I2", tx).await else {
            panic!("switching rooms should succeed");
        };
        assert_eq!(receipt.previous_room.as_deref(), Some("I1"));
        assert!(router.members("I1").await.is_empty());
        assert_eq!(router.members("I2").await, vec![a]);
        assert_eq!(router.room_of(a).await.as_deref(), Some("I2"));
    }

    #[tokio::test]
    async fn leave_drops_empty_room() {
        let router = RoomRouter::default();
        let (a, _rx) = joined(&router, "I1").await;
        assert_eq!(router.room_count().await, 1);

        assert_eq!(router.leave(a).await.as_deref(), Some("I1"));
        assert_eq!(router.room_count().await, 0);
        assert!(router.leave(a).await.is_none());
    }

    #[tokio::test]
    async fn full_room_rejects_join() {
        let router = RoomRouter::new(2, 0);
        let (_a, _rx_a) = joined(&router, "I1").await;
        let (b, _rx_b) = joined(&router, "I1").await;

        let (tx, _rx) = outbox();
        let result = router.join(ConnectionId::new(), "I1", tx.clone()).await;
        assert!(matches!(result, Err(RelayError::RoomFull { capacity: 2, .. })));
        assert_eq!(router.members("I1").await.len(), 2);

        // An existing member may rejoin its own room.
        assert!(router.join(b, "I1", tx).await.is_ok());
    }

    #[tokio::test]
    async fn late_joiner_receives_replay_in_order() {
        let router = RoomRouter::new(0, 2);
        let (a, _rx_a) = joined(&router, "I1").await;

        let _ = router.broadcast(a, "I1", &offer("1")).await;
        let _ = router.broadcast(a, "I1", &offer("2")).await;
        let _ = router.broadcast(a, "I1", &offer("3")).await;

        let b = ConnectionId::new();
        let (tx, mut rx_b) = outbox();
        let Ok(receipt) = router.join(b, "I1", tx).await else {
            panic!("join should succeed");
        };
        assert_eq!(receipt.replayed, 2);

        let seqs: Vec<Option<u64>> = std::iter::from_fn(|| rx_b.try_recv().ok())
            .map(|e| e.seq)
            .collect();
        assert_eq!(seqs, vec![Some(2), Some(3)]);
    }

    #[tokio::test]
    async fn presence_events_are_not_replayed() {
        let router = RoomRouter::new(0, 8);
        let (a, _rx_a) = joined(&router, "I1").await;
        let _ = router
            .broadcast(
                a,
                "I1",
                &ServerEvent::CandidateJoined {
                    candidate_id: "c1".to_string(),
                },
            )
            .await;

        let (_b, mut rx_b) = joined(&router, "I1").await;
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn closed_outbox_is_not_counted() {
        let router = RoomRouter::default();
        let (a, _rx_a) = joined(&router, "I1").await;
        let (_b, rx_b) = joined(&router, "I1").await;
        drop(rx_b);

        assert_eq!(router.broadcast(a, "I1", &offer("X")).await, 0);
    }

    #[tokio::test]
    async fn full_outbox_is_skipped_until_drained() {
        let router = RoomRouter::default();
        let (a, _rx_a) = joined(&router, "I1").await;
        let b = ConnectionId::new();
        let (tx, mut rx_b) = mpsc::channel(1);
        assert!(router.join(b, "I1", tx).await.is_ok());

        assert_eq!(router.broadcast(a, "I1", &offer("1")).await, 1);
        assert_eq!(router.broadcast(a, "I1", &offer("2")).await, 0);

        let Ok(first) = rx_b.try_recv() else {
            panic!("first event should be queued");
        };
        assert_eq!(first.data, serde_json::json!({ "sdp": "1" }));
        assert!(rx_b.try_recv().is_err());

        assert_eq!(router.broadcast(a, "I1", &offer("3")).await, 1);
    }

    #[tokio::test]
    async fn occupancy_lists_rooms_sorted() {
        let router = RoomRouter::default();
        let (_a, _rx_a) = joined(&router, "I2").await;
        let (_b, _rx_b) = joined(&router, "I1").await;
        let (_c, _rx_c) = joined(&router, "I1").await;

        let rooms = router.occupancy().await;
        assert_eq!(
            rooms,
            vec![
                RoomOccupancy {
                    interview_id: "I1".to_string(),
                    participants: 2
                },
                RoomOccupancy {
                    interview_id: "I2".to_string(),
                    participants: 1
                },
            ]
        );
    }
}
