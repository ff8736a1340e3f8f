//! Room monitoring DTOs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::common_dto::PaginationMeta;
use crate::domain::{RoomOccupancy, Session};

/// One active room in `GET /rooms`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoomSummaryDto {
    /// Interview id naming the room.
    pub interview_id: String,
    /// Connections currently in the room.
    pub participants: usize,
}

impl From<RoomOccupancy> for RoomSummaryDto {
    fn from(room: RoomOccupancy) -> Self {
        Self {
            interview_id: room.interview_id,
            participants: room.participants,
        }
    }
}

/// Paginated response for `GET /rooms`.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoomListResponse {
    /// Active rooms on this page.
    pub data: Vec<RoomSummaryDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// A joined connection as seen by `GET /rooms/{interview_id}`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ParticipantDto {
    /// Connection identifier.
    pub connection_id: uuid::Uuid,
    /// Candidate identifier the connection registered.
    pub candidate_id: String,
    /// When the connection joined.
    pub joined_at: DateTime<Utc>,
}

impl From<Session> for ParticipantDto {
    fn from(session: Session) -> Self {
        Self {
            connection_id: *session.connection_id.as_uuid(),
            candidate_id: session.candidate_id,
            joined_at: session.joined_at,
        }
    }
}

/// Response for `GET /rooms/{interview_id}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoomDetailResponse {
    /// Interview id naming the room.
    pub interview_id: String,
    /// Joined sessions, oldest first.
    pub participants: Vec<ParticipantDto>,
}
