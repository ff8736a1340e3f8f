//! REST API layer: route handlers, DTOs, and router composition.
//!
//! Monitoring endpoints are mounted under `/api/v1`; the health probe lives
//! at `/api/health`.

pub mod dto;
pub mod handlers;
pub mod openapi;

use axum::Router;

use crate::app_state::AppState;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}
