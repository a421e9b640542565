//! services/api/src/web/error.rs
//!
//! Request-level errors and their JSON rendering.

use crate::web::envelope::ErrorEnvelope;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use catalog_core::ports::PortError;
use tracing::error;

/// An error returned by a handler, rendered as `{ "success": false, "error": ... }`.
#[derive(Debug)]
pub struct HttpError {
    pub status: StatusCode,
    pub message: String,
}

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl From<PortError> for HttpError {
    fn from(e: PortError) -> Self {
        match e {
            PortError::NotFound(message) => Self::not_found(message),
            PortError::Validation(message) => Self::bad_request(message),
            PortError::Conflict(message) => Self::new(StatusCode::CONFLICT, message),
            e @ PortError::UnknownOrigin(_) => Self::bad_request(e.to_string()),
            PortError::Unexpected(message) => {
                error!("Backend fault: {}", message);
                Self::internal()
            }
        }
    }
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body = ErrorEnvelope {
            success: false,
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_errors_map_to_status_codes() {
        let cases = [
            (PortError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (PortError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (PortError::Conflict("x".into()), StatusCode::CONFLICT),
            (PortError::UnknownOrigin("Harvard".into()), StatusCode::BAD_REQUEST),
            (PortError::Unexpected("db down".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (port_error, status) in cases {
            assert_eq!(HttpError::from(port_error).status, status);
        }
    }

    #[test]
    fn backend_details_are_not_leaked() {
        let error = HttpError::from(PortError::Unexpected("password=hunter2".into()));
        assert!(!error.message.contains("hunter2"));
        assert_eq!(error.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
