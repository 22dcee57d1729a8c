//! Project member handlers.

use axum::Json;
use axum::extract::{Path, State};

use codehub_core::types::{ProjectId, UserId};
use codehub_entity::membership::Membership;
use codehub_service::membership::MemberList;

use super::{ApiResult, ok};
use crate::dto::request::ChangeRoleBody;
use crate::dto::response::MessageResponse;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/projects/{id}/members
pub async fn list_members(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<ProjectId>,
) -> ApiResult<MemberList> {
    ok(state
        .membership_service
        .list_members(&auth, project_id)
        .await?)
}

/// PUT /api/projects/{id}/members/{user_id}
pub async fn change_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((project_id, user_id)): Path<(ProjectId, UserId)>,
    Json(req): Json<ChangeRoleBody>,
) -> ApiResult<Membership> {
    ok(state
        .membership_service
        .change_role(&auth, project_id, user_id, req.role)
        .await?)
}

/// DELETE /api/projects/{id}/members/{user_id}
pub async fn remove_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((project_id, user_id)): Path<(ProjectId, UserId)>,
) -> ApiResult<MessageResponse> {
    state
        .membership_service
        .remove_member(&auth, project_id, user_id)
        .await?;
    ok(MessageResponse::new("Member removed"))
}
