use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::{analytics::AnalyticsError, task_service::TaskError, validation::FieldError};

/// Every failure a handler can return, already sorted by HTTP status.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{detail}")]
    Validation { detail: String, fields: Vec<FieldError> },
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unavailable(String),
    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'static str,
    detail: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a [FieldError]>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "validation_error",
            ApiError::InvalidArgument(_) => "invalid_argument",
            ApiError::NotFound(_) => "not_found",
            ApiError::Unavailable(_) => "service_unavailable",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            tracing::error!(%detail, "request failed");
        }

        let detail = self.to_string();
        let fields = match &self {
            ApiError::Validation { fields, .. } if !fields.is_empty() => Some(fields.as_slice()),
            _ => None,
        };
        let body = ErrorBody {
            code: self.code(),
            detail: &detail,
            fields,
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<TaskError> for ApiError {
    fn from(e: TaskError) -> Self {
        match e {
            TaskError::Validation(fields) => ApiError::Validation {
                detail: "Validation failed".to_string(),
                fields,
            },
            TaskError::InvalidId(raw) => ApiError::InvalidArgument(format!("Invalid task ID: {raw}")),
            TaskError::EmptyUpdate => ApiError::InvalidArgument("No fields to update".to_string()),
            TaskError::InvalidValue(e) => ApiError::InvalidArgument(e.to_string()),
            TaskError::NotFound(_) => ApiError::NotFound("Task not found".to_string()),
            e @ TaskError::Store { .. } => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<AnalyticsError> for ApiError {
    fn from(e: AnalyticsError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation {
            detail: rejection.body_text(),
            fields: Vec::new(),
        }
    }
}
