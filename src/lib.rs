//! # interview-relay
//!
//! WebSocket signaling relay for AI-assisted mock interviews.
//!
//! Browser peers connect to `/ws`, join a room named after their interview,
//! and exchange WebRTC offers, answers and ICE candidates plus interview
//! telemetry (submitted answers, sentiment and confidence scores). The relay
//! forwards every payload unmodified to the other members of the room.
//! Scoring and persistence live in other services; this crate only routes.
//!
//! ## Architecture
//!
//! ```text
//! Clients (WebSocket, HTTP)
//!     │
//!     ├── WS Handler (ws/)          ── REST monitoring (api/)
//!     │
//!     ├── RelayService (service/)
//!     │
//!     ├── SessionRegistry (domain/)
//!     └── RoomRouter (domain/) ──► per-connection outboxes
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod server;
pub mod service;
pub mod ws;
