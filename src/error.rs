use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use crate::types::ErrorBody;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Invalid record id: {0}")]
    InvalidRecordId(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IngestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            IngestError::InvalidPayload(_) | IngestError::InvalidRecordId(_) => {
                StatusCode::BAD_REQUEST
            }
            IngestError::NotFound(_) => StatusCode::NOT_FOUND,
            IngestError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            IngestError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            IngestError::Internal(_)
            | IngestError::Config(_)
            | IngestError::Json(_)
            | IngestError::Toml(_)
            | IngestError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to hand back to the caller. Server-side causes stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            IngestError::InvalidPayload(message)
            | IngestError::InvalidRecordId(message)
            | IngestError::NotFound(message)
            | IngestError::MethodNotAllowed(message)
            | IngestError::PayloadTooLarge(message) => message.clone(),
            _ => "Internal server error while processing the request.".to_string(),
        }
    }
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        (status, Json(ErrorBody::new(self.public_message()))).into_response()
    }
}

/// Body extraction failures keep the status axum chose but get our JSON shape.
impl From<BytesRejection> for IngestError {
    fn from(rejection: BytesRejection) -> Self {
        let status = rejection.status();
        let message = rejection.body_text();
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            IngestError::PayloadTooLarge(message)
        } else if status.is_client_error() {
            IngestError::InvalidPayload(message)
        } else {
            IngestError::Internal(message)
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_4xx() {
        assert_eq!(
            IngestError::InvalidPayload("no json".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            IngestError::InvalidRecordId("abc".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            IngestError::NotFound("record 9".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            IngestError::MethodNotAllowed("GET /webhook".into()).status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            IngestError::PayloadTooLarge("limit".into()).status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[test]
    fn internal_causes_are_not_exposed() {
        let err = IngestError::Internal("mutex exploded at 0xdeadbeef".into());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.public_message().contains("deadbeef"));

        let io = IngestError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert_eq!(io.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!io.public_message().contains("disk"));
    }

    #[test]
    fn client_messages_are_passed_through() {
        let err = IngestError::InvalidPayload("Request body must be JSON".into());
        assert_eq!(err.public_message(), "Request body must be JSON");
    }
}
