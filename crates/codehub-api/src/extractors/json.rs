//! JSON body extractor that runs `validator` rules before the handler.

use axum::Json;
use axum::extract::{FromRequest, Request};
use axum::extract::rejection::JsonRejection;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use codehub_core::error::AppError;

use crate::error::ApiError;

/// A deserialized and validated JSON body.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_to_error)?;
        value.validate().map_err(validation_to_error)?;
        Ok(Self(value))
    }
}

fn rejection_to_error(rejection: JsonRejection) -> ApiError {
    AppError::validation(format!("Invalid request body: {}", rejection.body_text())).into()
}

fn validation_to_error(errors: ValidationErrors) -> ApiError {
    let field_errors = errors.field_errors();
    let mut fields: Vec<String> = field_errors.keys().map(|k| k.to_string()).collect();
    fields.sort();

    let reasons: Vec<String> = fields
        .iter()
        .map(|field| {
            let reason = field_errors
                .get(field.as_str())
                .and_then(|errs| errs.first())
                .and_then(|e| e.message.as_ref())
                .map(|m| m.to_string())
                .unwrap_or_else(|| "is invalid".to_string());
            format!("{field}: {reason}")
        })
        .collect();

    AppError::validation(format!("Validation failed: {}", reasons.join(", ")))
        .with_details(serde_json::json!({ "fields": fields }))
        .into()
}
