//! Project chat handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use codehub_core::types::ProjectId;
use codehub_core::types::pagination::PageResponse;
use codehub_entity::chat::ChatMessage;
use codehub_realtime::{ChannelName, OutboundMessage};

use super::{ApiResult, ok};
use crate::dto::request::ChatMessageBody;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, PaginationParams, ValidatedJson};
use crate::state::AppState;

/// GET /api/projects/{id}/chat
pub async fn list_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<ProjectId>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<PageResponse<ChatMessage>> {
    ok(state
        .chat_service
        .list_messages(&auth, project_id, params.into_page_request())
        .await?)
}

/// POST /api/projects/{id}/chat
///
/// Persists the message, then relays it to the project channel.
pub async fn post_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<ProjectId>,
    ValidatedJson(req): ValidatedJson<ChatMessageBody>,
) -> Result<(StatusCode, Json<ApiResponse<ChatMessage>>), ApiError> {
    let message = state
        .chat_service
        .post_message(&auth, project_id, &req.body)
        .await?;

    state.realtime.connections.broadcast(
        ChannelName::Project(project_id),
        &OutboundMessage::Chat {
            message: message.clone(),
        },
        None,
    );

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(message))))
}
