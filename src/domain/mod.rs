//! Domain layer: connection identity, sessions, rooms and relayed events.
//!
//! This module holds the relay's in-memory state: the session registry
//! linking connections to candidates and interviews, and the room router
//! that fans events out to the other members of an interview room.

pub mod connection_id;
pub mod relay_event;
pub mod room_router;
pub mod session;
pub mod session_registry;

pub use connection_id::ConnectionId;
pub use relay_event::{RelayedEvent, ServerEvent};
pub use room_router::{JoinReceipt, Outbox, RoomOccupancy, RoomRouter};
pub use session::Session;
pub use session_registry::SessionRegistry;
