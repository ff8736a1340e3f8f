//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::RelayConfig;
use crate::domain::{RoomRouter, SessionRegistry};
use crate::service::RelayService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Relay service owning this instance's sessions and rooms.
    pub relay: Arc<RelayService>,
    /// Bound of each connection's outbound queue.
    pub outbox_capacity: usize,
}

impl AppState {
    /// Builds a fresh, isolated relay instance from `config`.
    #[must_use]
    pub fn new(config: &RelayConfig) -> Self {
        let sessions = Arc::new(SessionRegistry::new());
        let router = Arc::new(RoomRouter::new(
            config.max_room_participants,
            config.room_replay_capacity,
        ));
        Self {
            relay: Arc::new(RelayService::new(sessions, router)),
            outbox_capacity: config.outbox_capacity.max(1),
        }
    }
}
