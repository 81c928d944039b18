//! HTTP error responses for web adapter.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::domain::error::TrackerError;

#[derive(Debug)]
pub struct WebError {
    pub status: StatusCode,
    pub message: String,
}

impl WebError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl From<TrackerError> for WebError {
    fn from(err: TrackerError) -> Self {
        if !err.is_client_error() {
            tracing::error!(error = %err, "request failed");
        }
        Self::new(status_from_error(&err), err.to_string())
    }
}

// Extractor rejections keep axum's status and message but use the JSON body.
impl From<JsonRejection> for WebError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for WebError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for WebError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

pub fn status_from_error(err: &TrackerError) -> StatusCode {
    match err {
        TrackerError::NotFound { .. } => StatusCode::NOT_FOUND,
        TrackerError::IdMismatch { .. }
        | TrackerError::InvalidRecord { .. }
        | TrackerError::InvalidPage { .. }
        | TrackerError::InvalidDate { .. } => StatusCode::BAD_REQUEST,
        TrackerError::ConfigMissing { .. }
        | TrackerError::ConfigInvalid { .. }
        | TrackerError::ConfigParse { .. }
        | TrackerError::Database { .. }
        | TrackerError::DatabaseQuery { .. }
        | TrackerError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
