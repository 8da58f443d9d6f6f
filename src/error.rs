//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// # Error Categories
///
/// - **Client Errors**: The inbound payload is not JSON or lacks required fields
/// - **Backend Errors**: The game server could not be reached or answered garbage.
///   The payment pipeline converts these into result records; one that escapes
///   it is treated as an internal error.
/// - **Internal Errors**: Anything else; details stay in the server log
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Request body is not a JSON object.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("Request body is not a valid JSON object: {0}")]
    MalformedPayload(String),

    /// One or more required keys are absent (or null).
    ///
    /// Returns HTTP 400 Bad Request. Holds every missing field name.
    #[error("Missing required parameters: {}", .0.join(", "))]
    MissingField(Vec<String>),

    /// The game server could not be contacted (connect failure, timeout, DNS).
    #[error("Game server unreachable: {0}")]
    BackendUnreachable(#[from] reqwest::Error),

    /// The game server answered with a body that is not a JSON object.
    #[error("Game server returned an invalid response: {0}")]
    InvalidBackendResponse(String),

    /// The route exists but not for this HTTP method.
    ///
    /// Returns HTTP 405 Method Not Allowed.
    #[error("Unsupported HTTP method")]
    MethodNotAllowed,

    /// Unexpected failure while handling the request.
    ///
    /// Returns HTTP 500 Internal Server Error.
    /// The String is logged, never sent to the client.
    #[error("Internal failure: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MalformedPayload(_) | AppError::MissingField(_) => StatusCode::BAD_REQUEST,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::BackendUnreachable(_)
            | AppError::InvalidBackendResponse(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// ```json
/// {
///   "success": false,
///   "message": "Human-readable error message"
/// }
/// ```
///
/// # Status Code Mapping
///
/// - `MalformedPayload`, `MissingField` → 400 Bad Request
/// - `MethodNotAllowed` → 405 Method Not Allowed
/// - `Internal` and the backend errors → 500 Internal Server Error (hides details from client)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match &self {
            AppError::Internal(detail) => {
                tracing::error!("Internal failure while handling request: {}", detail);
                "An internal error occurred".to_string()
            }
            AppError::BackendUnreachable(_) | AppError::InvalidBackendResponse(_) => {
                tracing::error!("Backend error escaped the payment pipeline: {}", self);
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        (status, failure_body(&message)).into_response()
    }
}

/// The `{"success": false, "message": ...}` body every payment route fails with.
pub fn failure_body(message: &str) -> Json<serde_json::Value> {
    Json(json!({
        "success": false,
        "message": message
    }))
}
