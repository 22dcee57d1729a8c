//! Document handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use codehub_core::types::DocumentId;
use codehub_entity::document::Document;
use codehub_service::document::CreateDocumentRequest;

use super::{ApiResult, ok};
use crate::dto::request::{CreateDocumentBody, MoveDocumentBody, RenameBody, UpdateContentBody};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// POST /api/documents
pub async fn create_document(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateDocumentBody>,
) -> Result<(StatusCode, Json<ApiResponse<Document>>), ApiError> {
    let document = state
        .document_service
        .create_document(
            &auth,
            CreateDocumentRequest {
                project_id: req.project_id,
                folder_id: req.folder_id,
                name: req.name,
                content: req.content,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(document))))
}

/// GET /api/documents/{id}
pub async fn get_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DocumentId>,
) -> ApiResult<Document> {
    ok(state.document_service.get_document(&auth, id).await?)
}

/// PUT /api/documents/{id}/content
pub async fn update_content(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DocumentId>,
    Json(req): Json<UpdateContentBody>,
) -> ApiResult<Document> {
    ok(state
        .document_service
        .update_content(&auth, id, &req.content)
        .await?)
}

/// PUT /api/documents/{id}/name
pub async fn rename_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DocumentId>,
    ValidatedJson(req): ValidatedJson<RenameBody>,
) -> ApiResult<Document> {
    ok(state
        .document_service
        .rename_document(&auth, id, &req.name)
        .await?)
}

/// PUT /api/documents/{id}/move
pub async fn move_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DocumentId>,
    Json(req): Json<MoveDocumentBody>,
) -> ApiResult<Document> {
    ok(state
        .document_service
        .move_document(&auth, id, req.folder_id)
        .await?)
}

/// DELETE /api/documents/{id}
pub async fn delete_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DocumentId>,
) -> ApiResult<MessageResponse> {
    state.document_service.delete_document(&auth, id).await?;
    ok(MessageResponse::new("Document deleted"))
}
