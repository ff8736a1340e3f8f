//! Relay service: interprets client events and drives sessions and rooms.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{ConnectionId, Outbox, RoomRouter, ServerEvent, Session, SessionRegistry};
use crate::error::RelayError;
use crate::ws::messages::{ClientEvent, JoinInterview};

/// Signaling protocol handler.
///
/// Owns references to the [`SessionRegistry`] and [`RoomRouter`] of one
/// relay instance. Every method is a pair of in-memory lookups plus a
/// fan-out into connection outboxes; nothing blocks on the network.
#[derive(Debug, Clone)]
pub struct RelayService {
    sessions: Arc<SessionRegistry>,
    router: Arc<RoomRouter>,
}

impl RelayService {
    /// Creates a new `RelayService`.
    #[must_use]
    pub fn new(sessions: Arc<SessionRegistry>, router: Arc<RoomRouter>) -> Self {
        Self { sessions, router }
    }

    /// Returns a reference to the inner [`SessionRegistry`].
    #[must_use]
    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    /// Returns a reference to the inner [`RoomRouter`].
    #[must_use]
    pub fn router(&self) -> &Arc<RoomRouter> {
        &self.router
    }

    /// Registration point for a new connection.
    ///
    /// Sessions are created lazily on `join-interview`, so this only logs.
    pub fn on_connect(&self, connection_id: ConnectionId) {
        tracing::info!(connection = %connection_id, "client connected");
    }

    /// Dispatches one parsed client event.
    ///
    /// Returns the number of peers the resulting event was delivered to.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::RoomFull`] if a `join-interview` targets a full
    /// room. Relay events never fail; undeliverable ones are dropped.
    pub async fn handle(
        &self,
        connection_id: ConnectionId,
        outbox: &Outbox,
        event: ClientEvent,
    ) -> Result<usize, RelayError> {
        let (interview_id, server_event) = match event {
            ClientEvent::JoinInterview(join) => {
                return self.join_interview(connection_id, outbox.clone(), join).await;
            }
            ClientEvent::Offer(p) => (p.interview_id, ServerEvent::Offer(p.offer)),
            ClientEvent::Answer(p) => (p.interview_id, ServerEvent::Answer(p.answer)),
            ClientEvent::IceCandidate(p) => {
                (p.interview_id, ServerEvent::IceCandidate(p.candidate))
            }
            ClientEvent::QuestionAnswered(p) => (
                p.interview_id,
                ServerEvent::AnswerReceived {
                    question_id: p.question_id,
                    answer: p.answer,
                    audio_url: p.audio_url,
                    timestamp: Utc::now(),
                },
            ),
            ClientEvent::SentimentUpdate(p) => {
                (p.interview_id, ServerEvent::SentimentUpdated(p.sentiment))
            }
            ClientEvent::ConfidenceUpdate(p) => {
                (p.interview_id, ServerEvent::ConfidenceUpdated(p.confidence))
            }
        };

        Ok(self.relay(connection_id, &interview_id, &server_event).await)
    }

    /// Joins `connection_id` to the interview room and announces it.
    ///
    /// Overwrites any earlier session of the same connection. If the
    /// connection switches rooms or candidate id, the room of the old
    /// session receives `candidate-left` for the old candidate id.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::RoomFull`] if the room is at capacity; no
    /// session is created in that case.
    pub async fn join_interview(
        &self,
        connection_id: ConnectionId,
        outbox: Outbox,
        join: JoinInterview,
    ) -> Result<usize, RelayError> {
        let JoinInterview {
            interview_id,
            candidate_id,
        } = join;

        let receipt = self
            .router
            .join(connection_id, &interview_id, outbox)
            .await?;

        let replaced = self
            .sessions
            .insert(Session::new(connection_id, &interview_id, &candidate_id))
            .await;

        // The old identity is gone if either the room or the candidate changed.
        if let Some(previous) = replaced
            && (previous.interview_id != interview_id || previous.candidate_id != candidate_id)
        {
            let _ = self
                .router
                .broadcast(
                    connection_id,
                    &previous.interview_id,
                    &ServerEvent::CandidateLeft {
                        candidate_id: previous.candidate_id,
                    },
                )
                .await;
        }

        let delivered = self
            .router
            .broadcast(
                connection_id,
                &interview_id,
                &ServerEvent::CandidateJoined {
                    candidate_id: candidate_id.clone(),
                },
            )
            .await;

        tracing::info!(
            connection = %connection_id,
            %candidate_id,
            %interview_id,
            replayed = receipt.replayed,
            "candidate joined interview"
        );
        Ok(delivered)
    }

    /// Forwards `event` to the other members of `interview_id`.
    ///
    /// Only a connection that has joined `interview_id` may address it;
    /// anything else is dropped.
    pub async fn relay(
        &self,
        connection_id: ConnectionId,
        interview_id: &str,
        event: &ServerEvent,
    ) -> usize {
        let joined = self
            .sessions
            .get(connection_id)
            .await
            .is_some_and(|s| s.interview_id == interview_id);
        if !joined {
            tracing::debug!(
                connection = %connection_id,
                interview_id,
                event = event.event_name(),
                "dropping event from connection outside the room"
            );
            return 0;
        }

        self.router
            .broadcast(connection_id, interview_id, event)
            .await
    }

    /// Tears down the session of a closed connection.
    ///
    /// Announces `candidate-left` to the connection's room. Calling this
    /// for a connection that never joined, or twice, is a no-op.
    pub async fn on_disconnect(&self, connection_id: ConnectionId) -> Option<Session> {
        let session = self.sessions.remove(connection_id).await;

        if let Some(session) = &session {
            let _ = self
                .router
                .broadcast(
                    connection_id,
                    &session.interview_id,
                    &ServerEvent::CandidateLeft {
                        candidate_id: session.candidate_id.clone(),
                    },
                )
                .await;
        }
        let _ = self.router.leave(connection_id).await;

        tracing::info!(connection = %connection_id, "client disconnected");
        session
    }
}
