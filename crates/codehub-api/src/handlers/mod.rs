//! HTTP handlers, one module per domain.

pub mod chat;
pub mod document;
pub mod folder;
pub mod health;
pub mod invitation;
pub mod member;
pub mod permission;
pub mod project;
pub mod ws;

use axum::Json;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;

/// Return type of every JSON handler.
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Wrap `data` in the success envelope.
pub(crate) fn ok<T: serde::Serialize>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::ok(data)))
}
