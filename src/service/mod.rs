//! Service layer: signaling protocol handling.
//!
//! [`RelayService`] is the single entry point used by the WebSocket layer
//! and the REST monitoring endpoints.

pub mod relay_service;

pub use relay_service::RelayService;
