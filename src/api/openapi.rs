//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use super::handlers::{room, system};

/// Generated OpenAPI description of the monitoring endpoints.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "interview-relay",
        description = "Signaling relay for AI-assisted mock interviews. The signaling protocol itself runs over the `/ws` WebSocket."
    ),
    paths(system::health_handler, room::list_rooms, room::get_room),
    tags(
        (name = "System", description = "Service health"),
        (name = "Rooms", description = "Live interview rooms"),
    )
)]
pub struct ApiDoc;
