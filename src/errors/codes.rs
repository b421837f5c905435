use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Stable machine-readable error codes carried in every error body.
///
/// Codes are fixed-width strings and never change meaning once published;
/// new failure categories get new codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum ErrorCode {
    /// Input validation failed
    #[serde(rename = "00001")]
    Validation,

    /// Anything the pipeline did not anticipate
    #[serde(rename = "00009")]
    Unhandled,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "00001",
            Self::Unhandled => "00009",
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::Unhandled => 500,
        }
    }

    /// Summary sent to the client in the `message` field
    pub fn message(&self) -> &'static str {
        match self {
            Self::Validation => "Validation errors",
            Self::Unhandled => "Unhandled error",
        }
    }
}
