//! Session record linking a live connection to a candidate and interview.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ConnectionId;

/// One joined connection.
///
/// Created when the connection emits `join-interview` and destroyed when
/// the connection closes. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Connection this session belongs to.
    pub connection_id: ConnectionId,
    /// Opaque candidate identifier supplied by the client.
    pub candidate_id: String,
    /// Opaque interview identifier; doubles as the room key.
    pub interview_id: String,
    /// When the connection joined its room.
    pub joined_at: DateTime<Utc>,
}

impl Session {
    /// Creates a new session stamped with the current time.
    #[must_use]
    pub fn new(
        connection_id: ConnectionId,
        interview_id: impl Into<String>,
        candidate_id: impl Into<String>,
    ) -> Self {
        Self {
            connection_id,
            candidate_id: candidate_id.into(),
            interview_id: interview_id.into(),
            joined_at: Utc::now(),
        }
    }
}
