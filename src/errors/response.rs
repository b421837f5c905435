use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::codes::ErrorCode;

/// Structured error body written for every translated failure.
///
/// Field order here is the wire order: `message`, `errors`, `code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable summary
    pub message: String,
    /// Per-item details, empty when not applicable
    pub errors: Vec<String>,
    /// Error code for programmatic handling
    #[schema(value_type = String, example = "00001")]
    pub code: ErrorCode,
}

impl ErrorResponse {
    /// Create a new error response for `code` with the given details
    pub fn new(code: ErrorCode, errors: Vec<String>) -> Self {
        Self {
            message: code.message().to_string(),
            errors,
            code,
        }
    }

    pub fn validation(errors: Vec<String>) -> Self {
        Self::new(ErrorCode::Validation, errors)
    }

    pub fn unhandled() -> Self {
        Self::new(ErrorCode::Unhandled, Vec::new())
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.code.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Serialize to the JSON wire body
    pub fn to_json_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match self.to_json_bytes() {
            Ok(body) => (
                status,
                [(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                )],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize error response");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
