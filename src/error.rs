// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::any::Any;
use std::fmt;

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500, no database configured for this deployment
    NotConfigured,

    // 400 Bad Request
    BadRequest(String),

    // 500 Internal Server Error
    InternalServerError(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Never empty.
    pub fn message(&self) -> String {
        match self {
            AppError::NotConfigured => "DB not configured".to_string(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::InternalServerError(msg) if msg.trim().is_empty() => {
                "Server error".to_string()
            }
            AppError::InternalServerError(msg) => msg.clone(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Every error becomes `{ "ok": false, "message": ... }` with the mapped status.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();

        match &self {
            AppError::NotConfigured => tracing::error!("Comment lookup without a database"),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg)
            }
            AppError::BadRequest(msg) => tracing::debug!("Bad Request: {}", msg),
        }

        let body = Json(json!({
            "ok": false,
            "message": message,
        }));

        (status, body).into_response()
    }
}

/// Turns a panic caught by `CatchPanicLayer` into the usual 500 envelope.
/// The panic payload becomes the message when it is a string.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else {
        String::new()
    };

    AppError::InternalServerError(message).into_response()
}

/// Converts `sqlx::Error` into `AppError::InternalServerError`.
/// Allows using `?` operator on database queries.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_configured_maps_to_500() {
        let err = AppError::NotConfigured;
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "DB not configured");
    }

    #[test]
    fn test_bad_request_keeps_message() {
        let err = AppError::BadRequest("Bad manga id".to_string());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Bad manga id");
    }

    #[test]
    fn test_empty_internal_message_becomes_generic() {
        let err = AppError::InternalServerError(String::new());
        assert_eq!(err.message(), "Server error");

        let err = AppError::InternalServerError("relation does not exist".to_string());
        assert_eq!(err.message(), "relation does not exist");
    }

    #[test]
    fn test_panic_payloads_map_to_500() {
        let response = panic_response(Box::new("driver exploded"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = panic_response(Box::new(format!("row {}", 3)));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = panic_response(Box::new(17u8));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
