//! Folder CRUD handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use codehub_auth::CascadeReport;
use codehub_core::types::FolderId;
use codehub_entity::folder::Folder;
use codehub_service::folder::{CreateFolderRequest, FolderContents};

use super::{ApiResult, ok};
use crate::dto::request::{CreateFolderBody, MoveFolderBody, RenameBody};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// POST /api/folders
pub async fn create_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateFolderBody>,
) -> Result<(StatusCode, Json<ApiResponse<Folder>>), ApiError> {
    let folder = state
        .folder_service
        .create_folder(
            &auth,
            CreateFolderRequest {
                project_id: req.project_id,
                parent_id: req.parent_id,
                name: req.name,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(folder))))
}

/// GET /api/folders/{id}
pub async fn get_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<FolderId>,
) -> ApiResult<Folder> {
    ok(state.folder_service.get_folder(&auth, id).await?)
}

/// GET /api/folders/{id}/children
pub async fn list_children(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<FolderId>,
) -> ApiResult<FolderContents> {
    ok(state.folder_service.list_children(&auth, id).await?)
}

/// GET /api/folders/{id}/path
pub async fn folder_path(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<FolderId>,
) -> ApiResult<Vec<Folder>> {
    ok(state.folder_service.folder_path(&auth, id).await?)
}

/// PUT /api/folders/{id}/name
pub async fn rename_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<FolderId>,
    ValidatedJson(req): ValidatedJson<RenameBody>,
) -> ApiResult<Folder> {
    ok(state
        .folder_service
        .rename_folder(&auth, id, &req.name)
        .await?)
}

/// PUT /api/folders/{id}/move
pub async fn move_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<FolderId>,
    Json(req): Json<MoveFolderBody>,
) -> ApiResult<Folder> {
    ok(state
        .folder_service
        .move_folder(&auth, id, req.parent_id)
        .await?)
}

/// DELETE /api/folders/{id}
///
/// Answers 207 with the report when the removal stopped part-way.
pub async fn delete_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<FolderId>,
) -> ApiResult<CascadeReport> {
    ok(state.folder_service.delete_folder(&auth, id).await?)
}
