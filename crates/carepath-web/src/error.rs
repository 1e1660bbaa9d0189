//! API error types with structured JSON responses.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

/// One offending input field, addressed by its JSON path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Request validation failed")]
    Validation(Vec<FieldError>),
    #[error("Malformed request body: {0}")]
    MalformedBody(String),
    #[error("Classifier model not loaded")]
    ClassifierUnavailable,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, fields) = match self {
            ApiError::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_FAILED",
                "Request validation failed".to_string(),
                fields,
            ),
            ApiError::MalformedBody(detail) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_FAILED",
                "Malformed request body".to_string(),
                vec![FieldError::new("body", detail)],
            ),
            ApiError::ClassifierUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "CLASSIFIER_UNAVAILABLE",
                "No classifier model is loaded".to_string(),
                vec![],
            ),
        };

        let body = ErrorBody {
            error: ErrorDetail { code: code.to_string(), message, fields },
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedBody(rejection.body_text())
    }
}
