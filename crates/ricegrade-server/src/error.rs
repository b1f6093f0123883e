use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ricegrade_core::{GradeError, ScoreError, ValidationError};
use ricegrade_store::StoreError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Every failure a handler can return, rendered as `{ "error", "message" }`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Grade(#[from] GradeError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Body that is not JSON, lacks a content type, or does not fit the request shape.
    #[error(transparent)]
    Body(#[from] JsonRejection),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) | Self::Store(StoreError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "not_found")
            }
            Self::Grade(GradeError::StandardNotFound(_)) => {
                (StatusCode::NOT_FOUND, "standard_not_found")
            }
            Self::Grade(GradeError::Score(ScoreError::EmptyBatch)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "empty_batch")
            }
            Self::Grade(GradeError::Score(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "invalid_measurement")
            }
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_request"),
            Self::Body(rejection) => (rejection.status(), "invalid_request"),
            Self::Store(_) | Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Store(StoreError::NotFound(_)) => "Inspection not found".to_string(),
            Self::Body(rejection) => rejection.body_text(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": code, "message": self.message() }))).into_response()
    }
}
