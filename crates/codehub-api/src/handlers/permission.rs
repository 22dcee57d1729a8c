//! Override management, cascade, and permission introspection handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use codehub_auth::{CascadeReport, EditCapability, Resolution};
use codehub_core::types::{FolderId, UserId};
use codehub_entity::permission::{ResourceOverride, ResourceRef, ResourceType};
use codehub_service::permission::GrantOverrideRequest;

use super::{ApiResult, ok};
use crate::dto::request::{CheckQuery, RetryCascadeBody};
use crate::dto::response::RevokeResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// Parse the `{type}/{id}` path pair; `folder(s)` or `document(s)`.
fn resource_ref(resource_type: &str, id: Uuid) -> Result<ResourceRef, ApiError> {
    let resource_type: ResourceType = resource_type.parse()?;
    Ok(ResourceRef::new(resource_type, id))
}

/// GET /api/permissions/{type}/{id}
pub async fn list_overrides(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((resource_type, id)): Path<(String, Uuid)>,
) -> ApiResult<Vec<ResourceOverride>> {
    let resource = resource_ref(&resource_type, id)?;
    ok(state
        .permission_service
        .list_overrides(&auth, resource)
        .await?)
}

/// POST /api/permissions/{type}/{id}
pub async fn grant(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((resource_type, id)): Path<(String, Uuid)>,
    Json(req): Json<GrantOverrideRequest>,
) -> ApiResult<ResourceOverride> {
    let resource = resource_ref(&resource_type, id)?;
    ok(state.permission_service.grant(&auth, resource, req).await?)
}

/// DELETE /api/permissions/{type}/{id}/users/{user_id}
pub async fn revoke(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((resource_type, id, user_id)): Path<(String, Uuid, UserId)>,
) -> ApiResult<RevokeResponse> {
    let resource = resource_ref(&resource_type, id)?;
    let removed = state
        .permission_service
        .revoke(&auth, resource, user_id)
        .await?;
    ok(RevokeResponse { removed })
}

/// GET /api/permissions/{type}/{id}/can-edit
pub async fn can_edit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((resource_type, id)): Path<(String, Uuid)>,
) -> ApiResult<EditCapability> {
    let resource = resource_ref(&resource_type, id)?;
    ok(state.permission_service.can_edit(&auth, resource).await?)
}

/// GET /api/permissions/{type}/{id}/check?action=
pub async fn check(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((resource_type, id)): Path<(String, Uuid)>,
    Query(query): Query<CheckQuery>,
) -> ApiResult<Resolution> {
    let resource = resource_ref(&resource_type, id)?;
    ok(state
        .permission_service
        .check(&auth, resource, query.action)
        .await?)
}

/// POST /api/folders/{id}/subtree-permissions
pub async fn grant_subtree(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(folder_id): Path<FolderId>,
    Json(req): Json<GrantOverrideRequest>,
) -> ApiResult<CascadeReport> {
    ok(state
        .permission_service
        .grant_subtree(&auth, folder_id, req)
        .await?)
}

/// DELETE /api/folders/{id}/subtree-permissions/{user_id}
pub async fn revoke_subtree(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((folder_id, user_id)): Path<(FolderId, UserId)>,
) -> ApiResult<CascadeReport> {
    ok(state
        .permission_service
        .revoke_subtree(&auth, folder_id, user_id)
        .await?)
}

/// POST /api/cascades/retry
pub async fn retry_cascade(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<RetryCascadeBody>,
) -> ApiResult<CascadeReport> {
    ok(state
        .permission_service
        .retry_cascade(&auth, req.into())
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_ref_accepts_plural_segment() {
        let id = Uuid::new_v4();
        assert_eq!(
            resource_ref("documents", id).unwrap(),
            ResourceRef::Document(id.into())
        );
        assert_eq!(resource_ref("folder", id).unwrap(), ResourceRef::Folder(id.into()));
        assert!(resource_ref("files", id).is_err());
    }
}
