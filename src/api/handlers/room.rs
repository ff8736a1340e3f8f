//! Room monitoring endpoints: active rooms and their participants.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{
    PaginationParams, ParticipantDto, RoomDetailResponse, RoomListResponse, RoomSummaryDto,
};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, RelayError};

/// `GET /rooms` — List active interview rooms.
#[utoipa::path(
    get,
    path = "/api/v1/rooms",
    tag = "Rooms",
    summary = "List active rooms",
    description = "Returns a paginated list of interview rooms with at least one connected participant.",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated room list", body = RoomListResponse),
    )
)]
pub async fn list_rooms(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> impl IntoResponse {
    let rooms: Vec<RoomSummaryDto> = state
        .relay
        .router()
        .occupancy()
        .await
        .into_iter()
        .map(RoomSummaryDto::from)
        .collect();

    let (data, pagination) = params.paginate(rooms);
    Json(RoomListResponse { data, pagination })
}

/// `GET /rooms/:interview_id` — Sessions joined to one interview.
///
/// # Errors
///
/// Returns [`RelayError::RoomNotFound`] if nobody has joined the interview.
#[utoipa::path(
    get,
    path = "/api/v1/rooms/{interview_id}",
    tag = "Rooms",
    summary = "Get room participants",
    description = "Returns the candidate sessions currently joined to an interview room.",
    params(
        ("interview_id" = String, Path, description = "Interview identifier"),
    ),
    responses(
        (status = 200, description = "Room participants", body = RoomDetailResponse),
        (status = 404, description = "Room not found", body = ErrorResponse),
    )
)]
pub async fn get_room(
    State(state): State<AppState>,
    Path(interview_id): Path<String>,
) -> Result<impl IntoResponse, RelayError> {
    let sessions = state.relay.sessions().sessions_in(&interview_id).await;
    if sessions.is_empty() {
        return Err(RelayError::RoomNotFound(interview_id));
    }

    Ok(Json(RoomDetailResponse {
        interview_id,
        participants: sessions.into_iter().map(ParticipantDto::from).collect(),
    }))
}

/// Room monitoring routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/rooms", get(list_rooms))
        .route("/rooms/{interview_id}", get(get_room))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tokio::sync::mpsc;
    use tower::ServiceExt;

    use crate::app_state::AppState;
    use crate::config::RelayConfig;
    use crate::domain::ConnectionId;
    use crate::ws::messages::JoinInterview;

    async fn state_with_room() -> AppState {
        let state = AppState::new(&RelayConfig::default());
        let (outbox, _rx) = mpsc::channel(8);
        let joined = state
            .relay
            .join_interview(
                ConnectionId::new(),
                outbox,
                JoinInterview {
                    interview_id: "I1".to_string(),
                    candidate_id: "c1".to_string(),
                },
            )
            .await;
        assert!(joined.is_ok());
        state
    }

    async fn get(state: AppState, uri: &str) -> (StatusCode, serde_json::Value) {
        let app = crate::api::build_router().with_state(state);
        let Ok(request) = Request::builder().uri(uri).body(Body::empty()) else {
            panic!("valid request");
        };
        let Ok(response) = app.oneshot(request).await;
        let status = response.status();
        let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
            panic!("body should be readable");
        };
        let json = serde_json::from_slice(&bytes).unwrap_or_default();
        (status, json)
    }

    #[tokio::test]
    async fn list_rooms_reports_occupancy() {
        let (status, json) = get(state_with_room().await, "/api/v1/rooms").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json.pointer("/data/0/interview_id"),
            Some(&serde_json::json!("I1"))
        );
        assert_eq!(json.pointer("/data/0/participants"), Some(&serde_json::json!(1)));
        assert_eq!(json.pointer("/pagination/total"), Some(&serde_json::json!(1)));
    }

    #[tokio::test]
    async fn get_room_lists_candidates() {
        let (status, json) = get(state_with_room().await, "/api/v1/rooms/I1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json.pointer("/participants/0/candidate_id"),
            Some(&serde_json::json!("c1"))
        );
    }

    #[tokio::test]
    async fn unknown_room_is_404() {
        let (status, json) = get(state_with_room().await, "/api/v1/rooms/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json.pointer("/error/code"), Some(&serde_json::json!(2001)));
    }
}
