//! Project lifecycle and tree handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use codehub_core::types::ProjectId;
use codehub_entity::folder::ProjectTree;
use codehub_entity::project::Project;
use codehub_service::folder::FolderContents;
use codehub_service::project::{CreateProjectRequest, ProjectView};

use super::{ApiResult, ok};
use crate::dto::request::{CreateProjectBody, VisibilityBody};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// GET /api/projects
pub async fn list_projects(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Vec<Project>> {
    ok(state.project_service.list_projects(&auth).await?)
}

/// POST /api/projects
pub async fn create_project(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateProjectBody>,
) -> Result<(StatusCode, Json<ApiResponse<Project>>), ApiError> {
    let project = state
        .project_service
        .create_project(
            &auth,
            CreateProjectRequest {
                name: req.name,
                is_public: req.is_public,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(project))))
}

/// GET /api/projects/{id}
pub async fn get_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<ProjectId>,
) -> ApiResult<ProjectView> {
    ok(state.project_service.get_project(&auth, id).await?)
}

/// PUT /api/projects/{id}/visibility
pub async fn set_visibility(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<ProjectId>,
    Json(req): Json<VisibilityBody>,
) -> ApiResult<Project> {
    ok(state
        .project_service
        .set_visibility(&auth, id, req.is_public)
        .await?)
}

/// DELETE /api/projects/{id}
pub async fn delete_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<ProjectId>,
) -> ApiResult<MessageResponse> {
    state.project_service.delete_project(&auth, id).await?;
    ok(MessageResponse::new("Project deleted"))
}

/// GET /api/projects/{id}/tree
pub async fn get_tree(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<ProjectId>,
) -> ApiResult<ProjectTree> {
    ok(state.tree_service.get_project_tree(&auth, id).await?)
}

/// GET /api/projects/{id}/root
pub async fn list_root(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<ProjectId>,
) -> ApiResult<FolderContents> {
    ok(state.folder_service.list_root(&auth, id).await?)
}
