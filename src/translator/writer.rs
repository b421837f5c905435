use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("response headers already sent")]
    HeadersCommitted,

    #[error("response stream is closed")]
    Closed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Transport-side view of the outgoing response
pub trait ResponseWriter: Send {
    fn set_status(&mut self, status: StatusCode) -> Result<(), WriteError>;

    fn write_body(&mut self, bytes: &[u8]) -> Result<(), WriteError>;

    /// Drop whatever body bytes were written so far
    fn clear_body(&mut self) -> Result<(), WriteError>;

    /// Whether status and headers have already gone out on the wire
    fn is_committed(&self) -> bool;
}

/// In-memory response: status plus a growable body buffer.
///
/// `commit` and `close` model a transport that has already flushed headers or
/// lost its peer.
#[derive(Debug, Clone)]
pub struct BufferedResponse {
    status: StatusCode,
    body: Vec<u8>,
    committed: bool,
    closed: bool,
}

impl Default for BufferedResponse {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            body: Vec::new(),
            committed: false,
            closed: false,
        }
    }
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn commit(&mut self) {
        self.committed = true;
    }

    pub fn close(&mut self) {
        self.closed = true;
    }
}

impl ResponseWriter for BufferedResponse {
    fn set_status(&mut self, status: StatusCode) -> Result<(), WriteError> {
        if self.closed {
            return Err(WriteError::Closed);
        }
        if self.committed {
            return Err(WriteError::HeadersCommitted);
        }
        self.status = status;
        Ok(())
    }

    fn write_body(&mut self, bytes: &[u8]) -> Result<(), WriteError> {
        if self.closed {
            return Err(WriteError::Closed);
        }
        self.body.extend_from_slice(bytes);
        Ok(())
    }

    fn clear_body(&mut self) -> Result<(), WriteError> {
        if self.closed {
            return Err(WriteError::Closed);
        }
        if self.committed {
            return Err(WriteError::HeadersCommitted);
        }
        self.body.clear();
        Ok(())
    }

    fn is_committed(&self) -> bool {
        self.committed
    }
}

impl IntoResponse for BufferedResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        response
    }
}
