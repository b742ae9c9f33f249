use crate::{
    models::event::EventError,
    services::{
        codec::CodecError,
        object_store::StorageError,
        pipeline::PipelineError,
        record_table::TableError,
        records::RecordError,
    },
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// A lightweight wrapper for general errors that keeps the message local.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Shortcut for 404 Not Found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    /// Shortcut for 400 Bad Request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = self.status.as_u16(), "{}", self.message);
        }

        let body = Json(json!({
            "error": self.message,
            "status": self.status.as_u16()
        }));

        (self.status, body).into_response()
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        let status = match &err {
            StorageError::ObjectNotFound { .. } => StatusCode::NOT_FOUND,
            StorageError::AccessDenied { .. } => StatusCode::FORBIDDEN,
            StorageError::InvalidObjectKey | StorageError::InvalidBucketName { .. } => {
                StatusCode::BAD_REQUEST
            }
            StorageError::Sqlx(_) | StorageError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        AppError::new(status, err.to_string())
    }
}

impl From<TableError> for AppError {
    fn from(err: TableError) -> Self {
        AppError::internal(err.to_string())
    }
}

impl From<RecordError> for AppError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::NotFound(_) => AppError::not_found(err.to_string()),
            RecordError::Table(inner) => inner.into(),
        }
    }
}

impl From<EventError> for AppError {
    fn from(err: EventError) -> Self {
        AppError::bad_request(err.to_string())
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        let status = match &err {
            PipelineError::Fetch { source, .. } => match source {
                StorageError::ObjectNotFound { .. } => StatusCode::NOT_FOUND,
                StorageError::InvalidObjectKey | StorageError::InvalidBucketName { .. } => {
                    StatusCode::BAD_REQUEST
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            PipelineError::Codec {
                source: CodecError::Decode(_),
                ..
            } => StatusCode::UNPROCESSABLE_ENTITY,
            PipelineError::Codec { .. }
            | PipelineError::Store { .. }
            | PipelineError::Persist { .. }
            | PipelineError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        AppError::new(status, err.to_string())
    }
}
