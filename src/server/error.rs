//! HTTP error mapping for job outcomes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Error responses the parse endpoint can produce. Internal detail is
/// reduced to a message; stack traces never reach the client.
#[derive(Debug)]
pub enum ApiError {
    /// The job hit its deadline. Serialized as `{"timeout": message}` with
    /// a client-timeout status, matching what callers poll for.
    Timeout(String),
    /// Worker death or parser failure. Serialized as `{"error": message}`.
    Internal(String),
    /// The pool is shutting down or its bounded queue is full.
    Unavailable(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Timeout(message) => json!({ "timeout": message }),
            Self::Internal(message) | Self::Unavailable(message) => {
                json!({ "error": message })
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_maps_to_408() {
        assert_eq!(
            ApiError::Timeout("late".into()).status(),
            StatusCode::REQUEST_TIMEOUT
        );
    }

    #[test]
    fn internal_maps_to_500() {
        assert_eq!(
            ApiError::Internal("broken".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unavailable_maps_to_503() {
        assert_eq!(
            ApiError::Unavailable("closed".into()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
