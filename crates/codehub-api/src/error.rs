//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use codehub_core::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Structured context: `{canView, canEdit}` on a 403, the cascade
    /// report on a 207.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Handler error wrapping [`AppError`] so it can implement `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// HTTP status for an error kind.
    pub fn status_for(kind: ErrorKind) -> StatusCode {
        match kind {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Authentication => StatusCode::UNAUTHORIZED,
            ErrorKind::Authorization => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::StructuralViolation => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::PartialCascade => StatusCode::MULTI_STATUS,
            ErrorKind::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Internal
            | ErrorKind::Database
            | ErrorKind::Configuration
            | ErrorKind::Serialization => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = Self::status_for(err.kind);

        let body = if status.is_server_error() {
            tracing::error!(
                kind = %err.kind,
                error = %err.message,
                source = ?err.source,
                "Internal server error"
            );
            ApiErrorResponse {
                error: err.kind.to_string(),
                message: "Internal server error".to_string(),
                details: None,
            }
        } else {
            if err.is(ErrorKind::PartialCascade) {
                tracing::warn!(error = %err.message, "Returning partial cascade");
            }
            ApiErrorResponse {
                error: err.kind.to_string(),
                message: err.message,
                details: err.details,
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = ApiError(err).into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_denial_carries_hints() {
        let err = AppError::authorization("Write access denied")
            .with_details(serde_json::json!({ "canView": true, "canEdit": false }));
        let (status, body) = render(err).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "AUTHORIZATION");
        assert_eq!(body["details"]["canView"], true);
        assert_eq!(body["details"]["canEdit"], false);
    }

    #[tokio::test]
    async fn test_structural_and_partial_statuses() {
        let (status, _) = render(AppError::structural_violation("cycle")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let err = AppError::partial_cascade("stopped")
            .with_details(serde_json::json!({ "applied": [], "pending": [], "failure": "x" }));
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::MULTI_STATUS);
        assert_eq!(body["details"]["failure"], "x");
    }

    #[tokio::test]
    async fn test_internal_message_hidden() {
        let (status, body) = render(AppError::database("connection refused on 10.0.0.3")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "DATABASE");
        assert_eq!(body["message"], "Internal server error");
        assert!(body.get("details").is_none());
    }

    #[test]
    fn test_client_error_statuses() {
        assert_eq!(ApiError::status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::status_for(ErrorKind::Authentication),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::status_for(ErrorKind::Conflict), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::status_for(ErrorKind::Validation),
            StatusCode::BAD_REQUEST
        );
    }
}
