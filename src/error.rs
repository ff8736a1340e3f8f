//! Relay error types with HTTP status code mapping.
//!
//! [`RelayError`] is the central error type. Over HTTP each variant maps to
//! a status code and structured JSON body; over the WebSocket it becomes an
//! `error` event sent back to the offending connection only.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ServerEvent;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "room not found: I1"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
}

/// Relay error enum.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status               |
/// |-----------|-----------------|---------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request           |
/// | 2000–2999 | State/Not Found | 404 Not Found / 409 Conflict |
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Client frame could not be parsed or lacked required fields.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Client sent an event name the relay does not handle.
    #[error("unknown event: {0}")]
    UnknownEvent(String),

    /// The room already holds its maximum number of participants.
    #[error("interview {interview_id} is full ({capacity} participants)")]
    RoomFull {
        /// Room that rejected the join.
        interview_id: String,
        /// Configured participant limit.
        capacity: usize,
    },

    /// No joined sessions exist for the interview.
    #[error("room not found: {0}")]
    RoomNotFound(String),
}

impl RelayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidMessage(_) => 1001,
            Self::UnknownEvent(_) => 1002,
            Self::RoomNotFound(_) => 2001,
            Self::RoomFull { .. } => 2002,
        }
    }

    /// Returns the stable string code used in WebSocket `error` events.
    #[must_use]
    pub const fn wire_code(&self) -> &'static str {
        match self {
            Self::InvalidMessage(_) => "invalid_message",
            Self::UnknownEvent(_) => "unknown_event",
            Self::RoomNotFound(_) => "room_not_found",
            Self::RoomFull { .. } => "room_full",
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidMessage(_) | Self::UnknownEvent(_) => StatusCode::BAD_REQUEST,
            Self::RoomNotFound(_) => StatusCode::NOT_FOUND,
            Self::RoomFull { .. } => StatusCode::CONFLICT,
        }
    }

    /// Converts the error into the event reported to the client socket.
    #[must_use]
    pub fn to_event(&self) -> ServerEvent {
        ServerEvent::Error {
            code: self.wire_code().to_string(),
            message: self.to_string(),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn room_full_maps_to_conflict() {
        let err = RelayError::RoomFull {
            interview_id: "I1".to_string(),
            capacity: 2,
        };
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.error_code(), 2002);
        assert_eq!(err.to_string(), "interview I1 is full (2 participants)");
    }

    #[test]
    fn to_event_uses_wire_code() {
        let event = RelayError::UnknownEvent("ping".to_string()).to_event();
        let ServerEvent::Error { code, message } = event else {
            panic!("expected error event");
        };
        assert_eq!(code, "unknown_event");
        assert_eq!(message, "unknown event: ping");
    }

    #[test]
    fn into_response_sets_status() {
        let response = RelayError::RoomNotFound("I9".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
