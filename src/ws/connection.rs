//! Per-connection read/write loop.
//!
//! Each upgraded socket gets a fresh [`ConnectionId`] and a bounded
//! outbox. The loop reads client frames and hands them to the
//! [`RelayService`], and drains the outbox (room broadcasts and error
//! replies alike) into the socket in FIFO order.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use super::messages::ClientEvent;
use crate::domain::{ConnectionId, Outbox, RelayedEvent};
use crate::error::RelayError;
use crate::service::RelayService;

/// Runs the read/write loop for a single WebSocket connection.
///
/// Returns once the client closes the socket or a write fails; the
/// connection's session is torn down before returning. At most
/// `outbox_capacity` events wait for this socket; further room traffic for
/// it is dropped until the client catches up.
pub async fn run_connection(socket: WebSocket, relay: Arc<RelayService>, outbox_capacity: usize) {
    let connection_id = ConnectionId::new();
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (outbox, mut inbox) = mpsc::channel::<RelayedEvent>(outbox_capacity.max(1));

    relay.on_connect(connection_id);

    loop {
        tokio::select! {
            // Incoming frame from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Err(err) = dispatch(&relay, connection_id, &outbox, text.as_str()).await {
                            tracing::debug!(connection = %connection_id, error = %err, "rejected client frame");
                            if outbox.try_send(RelayedEvent::direct(&err.to_event())).is_err() {
                                tracing::warn!(connection = %connection_id, "outbox full, error reply dropped");
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        tracing::debug!(connection = %connection_id, error = %err, "ws read failed");
                        break;
                    }
                    _ => {}
                }
            }
            // Event routed to this connection
            event = inbox.recv() => {
                let Some(event) = event else { break };
                match serde_json::to_string(&event) {
                    Ok(json) => {
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        tracing::warn!(connection = %connection_id, error = %err, "failed to encode event");
                    }
                }
            }
        }
    }

    let _ = relay.on_disconnect(connection_id).await;
    tracing::debug!(connection = %connection_id, "ws connection closed");
}

/// Parses one text frame and hands it to the relay.
async fn dispatch(
    relay: &RelayService,
    connection_id: ConnectionId,
    outbox: &Outbox,
    text: &str,
) -> Result<usize, RelayError> {
    let event = ClientEvent::parse(text)?;
    relay.handle(connection_id, outbox, event).await
}
