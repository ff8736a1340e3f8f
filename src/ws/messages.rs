//! WebSocket message types: client envelope and typed client events.
//!
//! Every client frame is a JSON text frame of the form
//! `{"event": "<name>", "data": {...}}`. Field names inside `data` are
//! camelCase. Only `interviewId` (and `candidateId` on join) is required;
//! every other payload field is forwarded as-is and is `null` when absent.
//! Outbound frames are [`crate::domain::RelayedEvent`]s.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::RelayError;

/// Raw client envelope before the payload is interpreted.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientEnvelope {
    /// Event name.
    pub event: String,
    /// Event payload; missing means `null`.
    #[serde(default)]
    pub data: Value,
}

/// `join-interview` payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinInterview {
    /// Room to join.
    pub interview_id: String,
    /// Candidate the connection speaks for.
    pub candidate_id: String,
}

/// `offer` payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferPayload {
    /// Target room.
    pub interview_id: String,
    /// SDP offer, forwarded as-is.
    #[serde(default)]
    pub offer: Value,
}

/// `answer` payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerPayload {
    /// Target room.
    pub interview_id: String,
    /// SDP answer, forwarded as-is.
    #[serde(default)]
    pub answer: Value,
}

/// `ice-candidate` payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidatePayload {
    /// Target room.
    pub interview_id: String,
    /// ICE candidate, forwarded as-is.
    #[serde(default)]
    pub candidate: Value,
}

/// `question-answered` payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAnswered {
    /// Target room.
    pub interview_id: String,
    /// Question being answered.
    #[serde(default)]
    pub question_id: Value,
    /// Answer body.
    #[serde(default)]
    pub answer: Value,
    /// Recorded audio location.
    #[serde(default)]
    pub audio_url: Value,
}

/// `sentiment-update` payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentUpdate {
    /// Target room.
    pub interview_id: String,
    /// Sentiment analysis output.
    #[serde(default)]
    pub sentiment: Value,
}

/// `confidence-update` payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceUpdate {
    /// Target room.
    pub interview_id: String,
    /// Confidence analysis output.
    #[serde(default)]
    pub confidence: Value,
}

/// Events a client can send.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// Join an interview room.
    JoinInterview(JoinInterview),
    /// Relay an SDP offer.
    Offer(OfferPayload),
    /// Relay an SDP answer.
    Answer(AnswerPayload),
    /// Relay an ICE candidate.
    IceCandidate(IceCandidatePayload),
    /// Relay a submitted answer as `answer-received`.
    QuestionAnswered(QuestionAnswered),
    /// Relay sentiment as `sentiment-updated`.
    SentimentUpdate(SentimentUpdate),
    /// Relay confidence as `confidence-updated`.
    ConfidenceUpdate(ConfidenceUpdate),
}

impl ClientEvent {
    /// Parses a client text frame.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidMessage`] if the frame is not a JSON
    /// envelope or the payload lacks a required field, and
    /// [`RelayError::UnknownEvent`] for an unrecognised event name.
    pub fn parse(text: &str) -> Result<Self, RelayError> {
        let envelope: ClientEnvelope = serde_json::from_str(text)
            .map_err(|e| RelayError::InvalidMessage(format!("malformed JSON: {e}")))?;

        let ClientEnvelope { event, data } = envelope;
        match event.as_str() {
            "join-interview" => payload(&event, data).map(Self::JoinInterview),
            "offer" => payload(&event, data).map(Self::Offer),
            "answer" => payload(&event, data).map(Self::Answer),
            "ice-candidate" => payload(&event, data).map(Self::IceCandidate),
            "question-answered" => payload(&event, data).map(Self::QuestionAnswered),
            "sentiment-update" => payload(&event, data).map(Self::SentimentUpdate),
            "confidence-update" => payload(&event, data).map(Self::ConfidenceUpdate),
            _ => Err(RelayError::UnknownEvent(event)),
        }
    }
}

fn payload<T: DeserializeOwned>(event: &str, data: Value) -> Result<T, RelayError> {
    serde_json::from_value(data)
        .map_err(|e| RelayError::InvalidMessage(format!("{event}: {e}")))
}
