//! HTTP mapping of sensing errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use isac_core::Error;

/// Handler error; wraps the workspace error and picks a status code
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self.0 {
            Error::InvalidFrame { .. } | Error::InvalidInput(_) | Error::EmptyBatch => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Error::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self.0 {
            Error::InvalidFrame { .. } => "INVALID_FRAME",
            Error::InvalidInput(_) => "INVALID_INPUT",
            Error::EmptyBatch => "EMPTY_BATCH",
            Error::Unavailable(_) => "UNAVAILABLE",
            _ => "INTERNAL_ERROR",
        }
    }
}

/// JSON error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
    pub retryable: bool,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() && !self.0.is_retryable() {
            tracing::error!(error = %self.0, "Sensing request failed");
        } else {
            tracing::warn!(error = %self.0, status = status.as_u16(), "Sensing request rejected");
        }

        let body = ErrorResponse {
            code: self.error_code(),
            message: self.0.to_string(),
            retryable: self.0.is_retryable(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        let cases = [
            (Error::invalid_frame("t0", "no samples"), StatusCode::UNPROCESSABLE_ENTITY),
            (Error::InvalidInput("numSamples".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (Error::EmptyBatch, StatusCode::UNPROCESSABLE_ENTITY),
            (Error::Unavailable("no units".into()), StatusCode::SERVICE_UNAVAILABLE),
            (Error::InvalidProbability(1.5), StatusCode::INTERNAL_SERVER_ERROR),
            (Error::Persistence("disk".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError(err).status_code(), status);
        }
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ApiError(Error::EmptyBatch).error_code(), "EMPTY_BATCH");
        assert_eq!(ApiError(Error::Model("bad".into())).error_code(), "INTERNAL_ERROR");
    }
}
