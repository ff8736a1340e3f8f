//! WebSocket layer: connection handling and client message parsing.
//!
//! The endpoint at `/ws` carries the named-event signaling protocol:
//! clients join an interview room and exchange WebRTC negotiation and
//! interview telemetry with the other members of that room.

pub mod connection;
pub mod handler;
pub mod messages;
