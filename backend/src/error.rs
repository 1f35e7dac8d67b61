//! Error types and error handling for the application
//!
//! This module defines the HTTP-facing error type. All errors implement
//! `IntoResponse` to provide consistent error formatting.

use crate::coordinator::CoordinatorError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error types
///
/// Each variant maps to one HTTP status via `IntoResponse`.
#[derive(Error, Debug)]
pub enum AppError {
    /// The coordinator no longer accepts work (process is shutting down)
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Request is malformed (blank list entries, blank agent names)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Request exceeds a configured limit
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),
}

impl From<CoordinatorError> for AppError {
    fn from(err: CoordinatorError) -> Self {
        match err {
            CoordinatorError::ShutDown => AppError::ServiceUnavailable(err.to_string()),
            CoordinatorError::InvalidAgentName(_) => AppError::InvalidRequest(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        };

        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinator_errors_map_to_status() {
        let shut_down = AppError::from(CoordinatorError::ShutDown).into_response();
        assert_eq!(shut_down.status(), StatusCode::SERVICE_UNAVAILABLE);

        let invalid =
            AppError::from(CoordinatorError::InvalidAgentName(String::new())).into_response();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_payload_too_large_status() {
        let response = AppError::PayloadTooLarge("too many".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_invalid_request_status() {
        let response =
            AppError::InvalidRequest("medications[0] is blank".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
