use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;
use validator::ValidationErrors;

use crate::domain::error::{DomainError, FieldViolation};

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("invalid fields: {0:?}")]
    Fields(Vec<FieldErrorDto>),

    #[error("malformed request body: {0}")]
    Body(#[from] JsonRejection),

    #[error("unexpected request body: {0}")]
    BodyShape(&'static str),

    #[error("request timed out")]
    Timeout,

    #[error("not found")]
    NotFound,
}

pub(crate) type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ErrorBody {
    pub(crate) message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) errors: Vec<FieldErrorDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct FieldErrorDto {
    pub(crate) field: String,
    pub(crate) code: String,
    pub(crate) message: String,
}

impl From<&FieldViolation> for FieldErrorDto {
    fn from(violation: &FieldViolation) -> Self {
        Self {
            field: violation.field.to_string(),
            code: violation.code.to_string(),
            message: violation.message.to_string(),
        }
    }
}

const VALIDATION_MESSAGE: &str = "Validation error";
const BODY_MESSAGE: &str = "Invalid request body";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            AppError::Domain(err) => match err {
                DomainError::Validation(violations) => (
                    StatusCode::BAD_REQUEST,
                    VALIDATION_MESSAGE.to_string(),
                    violations.iter().map(FieldErrorDto::from).collect(),
                ),
                DomainError::InvalidId(_) => (
                    StatusCode::BAD_REQUEST,
                    "Invalid post ID".to_string(),
                    Vec::new(),
                ),
                DomainError::NotFound(_) => (
                    StatusCode::NOT_FOUND,
                    "Post not found".to_string(),
                    Vec::new(),
                ),
                DomainError::Unexpected(cause) => {
                    error!(error = %cause, "storage fault");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                        Vec::new(),
                    )
                }
            },
            AppError::Fields(errors) => {
                (StatusCode::BAD_REQUEST, VALIDATION_MESSAGE.to_string(), errors)
            }
            AppError::Body(rejection) => {
                let status = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                    StatusCode::PAYLOAD_TOO_LARGE
                } else {
                    StatusCode::BAD_REQUEST
                };
                let detail = FieldErrorDto {
                    field: "body".to_string(),
                    code: "invalid_json".to_string(),
                    message: rejection.body_text(),
                };
                (status, BODY_MESSAGE.to_string(), vec![detail])
            }
            AppError::BodyShape(reason) => {
                let detail = FieldErrorDto {
                    field: "body".to_string(),
                    code: "invalid_type".to_string(),
                    message: reason.to_string(),
                };
                (StatusCode::BAD_REQUEST, BODY_MESSAGE.to_string(), vec![detail])
            }
            AppError::Timeout => (
                StatusCode::REQUEST_TIMEOUT,
                "Request timed out".to_string(),
                Vec::new(),
            ),
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string(), Vec::new()),
        };

        (status, Json(ErrorBody { message, errors })).into_response()
    }
}

/// Flattens validator output into a field-sorted list so every failing field is reported.
pub(crate) fn collect_field_errors(errors: &ValidationErrors) -> Vec<FieldErrorDto> {
    let mut out: Vec<FieldErrorDto> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, field_errors)| {
            field_errors.iter().map(move |err| FieldErrorDto {
                field: field.to_string(),
                code: err.code.to_string(),
                message: err
                    .message
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| err.code.to_string()),
            })
        })
        .collect();
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}
