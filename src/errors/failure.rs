use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    BoxError,
};
use std::any::Any;
use std::sync::Arc;
use thiserror::Error;

/// Business validation rejected the request input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed: {}", .errors.join("; "))]
pub struct ValidationFailure {
    pub errors: Vec<String>,
}

impl ValidationFailure {
    pub fn new<I, S>(errors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            errors: errors.into_iter().map(Into::into).collect(),
        }
    }
}

/// Downstream code panicked while handling the request.
#[derive(Debug, Clone, Error)]
#[error("handler panicked: {message}")]
pub struct PanicFailure {
    pub message: String,
}

impl PanicFailure {
    /// Extract a readable message from a `catch_unwind` payload
    pub fn from_payload(payload: Box<dyn Any + Send + 'static>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else {
            "unknown panic".to_string()
        };

        Self { message }
    }
}

/// Failure raised by request-handling code.
///
/// Handlers return `Result<T, Failure>`; the translator layer picks the failure
/// up from the response and writes the structured body.
#[derive(Debug, Error)]
pub enum Failure {
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    #[error("{0}")]
    Unhandled(#[source] BoxError),
}

impl Failure {
    pub fn validation<I, S>(errors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Validation(ValidationFailure::new(errors))
    }

    pub fn unhandled(err: impl Into<BoxError>) -> Self {
        Self::Unhandled(err.into())
    }
}

impl From<anyhow::Error> for Failure {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<ValidationFailure>() {
            Ok(validation) => Self::Validation(validation),
            Err(other) => Self::Unhandled(other.into()),
        }
    }
}

/// Response extension marking a response as a placeholder for a raised failure.
#[derive(Debug, Clone)]
pub struct RaisedFailure(pub Arc<Failure>);

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
        response
            .extensions_mut()
            .insert(RaisedFailure(Arc::new(self)));
        response
    }
}
