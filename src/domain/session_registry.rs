//! In-memory map from live connection to its joined session.
//!
//! [`SessionRegistry`] is owned by a single relay instance and injected
//! where needed; there is no process-wide session table. Sessions live only
//! as long as the process, so running several worker processes means each
//! sees only its own connections.

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::{ConnectionId, Session};

/// Store of all joined sessions, keyed by connection.
///
/// A connection has at most one session. Inserting for a connection that
/// already has one overwrites it.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<ConnectionId, Session>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites the session for its connection.
    ///
    /// Returns the session that was replaced, if any.
    pub async fn insert(&self, session: Session) -> Option<Session> {
        let mut map = self.sessions.write().await;
        map.insert(session.connection_id, session)
    }

    /// Returns a copy of the session for `connection_id`.
    pub async fn get(&self, connection_id: ConnectionId) -> Option<Session> {
        self.sessions.read().await.get(&connection_id).cloned()
    }

    /// Removes and returns the session for `connection_id`.
    ///
    /// Removing a connection that never joined is a no-op returning `None`.
    pub async fn remove(&self, connection_id: ConnectionId) -> Option<Session> {
        self.sessions.write().await.remove(&connection_id)
    }

    /// Returns every session joined to `interview_id`, oldest first.
    pub async fn sessions_in(&self, interview_id: &str) -> Vec<Session> {
        let map = self.sessions.read().await;
        let mut sessions: Vec<Session> = map
            .values()
            .filter(|s| s.interview_id == interview_id)
            .cloned()
            .collect();
        sessions.sort_by_key(|s| s.joined_at);
        sessions
    }

    /// Returns the number of joined sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Returns `true` if no connection has joined.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
