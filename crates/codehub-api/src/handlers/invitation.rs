//! Invitation handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use codehub_core::types::{InvitationId, ProjectId};
use codehub_entity::membership::{Invitation, Membership};
use codehub_service::membership::CreateInvitationRequest;

use super::{ApiResult, ok};
use crate::dto::request::CreateInvitationBody;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/projects/{id}/invitations
pub async fn invite(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<ProjectId>,
    Json(req): Json<CreateInvitationBody>,
) -> Result<(StatusCode, Json<ApiResponse<Invitation>>), ApiError> {
    let invitation = state
        .invitation_service
        .invite(
            &auth,
            project_id,
            CreateInvitationRequest {
                invitee_id: req.invitee_id,
                role: req.role,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(invitation))))
}

/// GET /api/projects/{id}/invitations
pub async fn list_for_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<ProjectId>,
) -> ApiResult<Vec<Invitation>> {
    ok(state
        .invitation_service
        .list_for_project(&auth, project_id)
        .await?)
}

/// GET /api/invitations/mine
pub async fn list_mine(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Vec<Invitation>> {
    ok(state.invitation_service.list_mine(&auth).await?)
}

/// POST /api/invitations/{id}/accept
pub async fn accept(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<InvitationId>,
) -> ApiResult<Membership> {
    ok(state.invitation_service.accept(&auth, id).await?)
}

/// POST /api/invitations/{id}/decline
pub async fn decline(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<InvitationId>,
) -> ApiResult<Invitation> {
    ok(state.invitation_service.decline(&auth, id).await?)
}

/// DELETE /api/invitations/{id}
pub async fn revoke(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<InvitationId>,
) -> ApiResult<Invitation> {
    ok(state.invitation_service.revoke(&auth, id).await?)
}
