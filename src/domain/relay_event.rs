//! Events the relay emits to connections.
//!
//! A [`ServerEvent`] is what the protocol handler decides to send; the
//! [`super::RoomRouter`] stamps it into a [`RelayedEvent`] (with room
//! sequence number and relay time) when it fans it out.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Event produced by the relay for delivery to one or more connections.
///
/// Signaling and telemetry payloads are carried as opaque JSON; the relay
/// never inspects SDP, ICE or scoring output.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// A connection joined the room.
    CandidateJoined {
        /// Candidate identifier of the joining connection.
        candidate_id: String,
    },
    /// A joined connection went away.
    CandidateLeft {
        /// Candidate identifier registered by the departed connection.
        candidate_id: String,
    },
    /// WebRTC session-description offer.
    Offer(Value),
    /// WebRTC session-description answer.
    Answer(Value),
    /// Trickled ICE candidate.
    IceCandidate(Value),
    /// The candidate submitted an answer to a question.
    AnswerReceived {
        /// Question the answer belongs to.
        question_id: Value,
        /// Answer body (text transcript or structured answer).
        answer: Value,
        /// Location of the recorded audio, if the client sent one.
        audio_url: Value,
        /// Server time at which the answer was relayed.
        timestamp: DateTime<Utc>,
    },
    /// Sentiment score computed for the candidate.
    SentimentUpdated(Value),
    /// Confidence score computed for the candidate.
    ConfidenceUpdated(Value),
    /// Error reported back to the connection that caused it.
    Error {
        /// Stable machine-readable code (e.g. `"room_full"`).
        code: String,
        /// Human-readable description.
        message: String,
    },
}

impl ServerEvent {
    /// Returns the wire event name.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::CandidateJoined { .. } => "candidate-joined",
            Self::CandidateLeft { .. } => "candidate-left",
            Self::Offer(_) => "offer",
            Self::Answer(_) => "answer",
            Self::IceCandidate(_) => "ice-candidate",
            Self::AnswerReceived { .. } => "answer-received",
            Self::SentimentUpdated(_) => "sentiment-updated",
            Self::ConfidenceUpdated(_) => "confidence-updated",
            Self::Error { .. } => "error",
        }
    }

    /// Returns `true` for presence notifications, which are never replayed.
    #[must_use]
    pub const fn is_presence(&self) -> bool {
        matches!(
            self,
            Self::CandidateJoined { .. } | Self::CandidateLeft { .. }
        )
    }

    /// Builds the JSON payload delivered under [`Self::event_name`].
    #[must_use]
    pub fn payload(&self) -> Value {
        match self {
            Self::CandidateJoined { candidate_id } | Self::CandidateLeft { candidate_id } => {
                serde_json::json!({ "candidateId": candidate_id })
            }
            Self::Offer(v)
            | Self::Answer(v)
            | Self::IceCandidate(v)
            | Self::SentimentUpdated(v)
            | Self::ConfidenceUpdated(v) => v.clone(),
            Self::AnswerReceived {
                question_id,
                answer,
                audio_url,
                timestamp,
            } => serde_json::json!({
                "questionId": question_id,
                "answer": answer,
                "audioUrl": audio_url,
                "timestamp": timestamp,
            }),
            Self::Error { code, message } => {
                serde_json::json!({ "code": code, "message": message })
            }
        }
    }
}

/// Wire form of an event as delivered to a connection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelayedEvent {
    /// Event name.
    pub event: &'static str,
    /// Event payload.
    pub data: Value,
    /// Per-room sequence number; absent for direct replies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
    /// Relay time.
    pub timestamp: DateTime<Utc>,
}

impl RelayedEvent {
    /// Stamps `event` with a room sequence number.
    #[must_use]
    pub fn sequenced(event: &ServerEvent, seq: u64) -> Self {
        Self {
            event: event.event_name(),
            data: event.payload(),
            seq: Some(seq),
            timestamp: Utc::now(),
        }
    }

    /// Wraps `event` for delivery outside any room (error replies).
    #[must_use]
    pub fn direct(event: &ServerEvent) -> Self {
        Self {
            event: event.event_name(),
            data: event.payload(),
            seq: None,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn signaling_payloads_pass_through_unchanged() {
        let sdp = serde_json::json!({ "sdp": "X", "type": "offer" });
        let event = ServerEvent::Offer(sdp.clone());
        assert_eq!(event.event_name(), "offer");
        assert_eq!(event.payload(), sdp);
    }

    #[test]
    fn presence_payload_carries_candidate_id() {
        let event = ServerEvent::CandidateLeft {
            candidate_id: "c1".to_string(),
        };
        assert!(event.is_presence());
        assert_eq!(event.payload(), serde_json::json!({ "candidateId": "c1" }));
    }

    #[test]
    fn answer_received_includes_server_timestamp() {
        let event = ServerEvent::AnswerReceived {
            question_id: serde_json::json!("q1"),
            answer: serde_json::json!("my answer"),
            audio_url: serde_json::json!("https://cdn/a.webm"),
            timestamp: Utc::now(),
        };
        let payload = event.payload();
        assert_eq!(payload.get("questionId"), Some(&serde_json::json!("q1")));
        assert!(payload.get("timestamp").is_some_and(Value::is_string));
        assert!(!event.is_presence());
    }

    #[test]
    fn direct_event_omits_seq() {
        let event = ServerEvent::Error {
            code: "room_full".to_string(),
            message: "full".to_string(),
        };
        let Ok(json) = serde_json::to_value(RelayedEvent::direct(&event)) else {
            panic!("serialization failed");
        };
        assert_eq!(json.get("event"), Some(&serde_json::json!("error")));
        assert!(json.get("seq").is_none());
    }

    #[test]
    fn sequenced_event_carries_seq() {
        let event = ServerEvent::SentimentUpdated(serde_json::json!({ "score": 0.8 }));
        let relayed = RelayedEvent::sequenced(&event, 7);
        assert_eq!(relayed.seq, Some(7));
        assert_eq!(relayed.event, "sentiment-updated");
    }
}
