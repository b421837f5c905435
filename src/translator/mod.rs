//! Last-resort failure boundary for the request pipeline.
//!
//! [`ExceptionTranslator`] runs the rest of the pipeline, and when that fails
//! (error or panic) it classifies the failure, logs it, and writes a structured
//! [`ErrorResponse`]. A request that completes normally is left untouched.

pub mod layer;
pub mod logger;
pub mod writer;

use axum::{
    http::{Request, StatusCode},
    BoxError,
};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::error::Error;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

pub use layer::{TranslatorLayer, TranslatorService};
pub use logger::{FailureLogger, TracingFailureLogger};
pub use writer::{BufferedResponse, ResponseWriter, WriteError};

use crate::errors::{ClassifiedFailure, ErrorCode, ErrorResponse, PanicFailure};
use crate::metrics::{FAILURES_TRANSLATED_TOTAL, FAILURE_RESPONSE_WRITE_ERRORS_TOTAL};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request details attached to every logged failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureContext {
    pub request_id: String,
    pub method: String,
    pub path: String,
}

impl FailureContext {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            method: method.into(),
            path: path.into(),
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    /// Build from an incoming request, reusing its `x-request-id` if present
    pub fn from_request<B>(request: &Request<B>) -> Self {
        let context = Self::new(request.method().to_string(), request.uri().path());

        match request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
        {
            Some(id) => context.with_request_id(id),
            None => context,
        }
    }
}

/// How a request left the translator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The next stage completed; nothing was written
    PassThrough,
    /// The next stage failed and an error body with this code was written
    Translated(ErrorCode),
}

/// Converts downstream failures into structured error responses.
///
/// Holds no per-request state, so one instance can be cloned into every
/// service and used concurrently.
#[derive(Clone)]
pub struct ExceptionTranslator {
    logger: Arc<dyn FailureLogger>,
}

impl Default for ExceptionTranslator {
    fn default() -> Self {
        Self::new(Arc::new(TracingFailureLogger))
    }
}

impl fmt::Debug for ExceptionTranslator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExceptionTranslator").finish_non_exhaustive()
    }
}

impl ExceptionTranslator {
    pub fn new(logger: Arc<dyn FailureLogger>) -> Self {
        Self { logger }
    }

    /// Run `next` against `writer`, translating any failure it raises.
    ///
    /// `next` is consumed, so a failed stage is never re-invoked. Panics inside
    /// `next` are caught and treated as unhandled failures.
    pub async fn handle<W, F>(&self, context: &FailureContext, writer: &mut W, next: F) -> Outcome
    where
        W: ResponseWriter,
        F: for<'w> FnOnce(&'w mut W) -> BoxFuture<'w, Result<(), BoxError>>,
    {
        let result = AssertUnwindSafe(async { next(&mut *writer).await })
            .catch_unwind()
            .await;

        let failure: BoxError = match result {
            Ok(Ok(())) => return Outcome::PassThrough,
            Ok(Err(err)) => err,
            Err(payload) => Box::new(PanicFailure::from_payload(payload)),
        };

        let body = self.translate(&*failure, context);
        let code = body.code;
        self.write_response(writer, &body, context);

        Outcome::Translated(code)
    }

    /// Classify and log `failure`, then build its response body.
    ///
    /// Logging happens before the body exists, so it is never skipped.
    pub fn translate(
        &self,
        failure: &(dyn Error + 'static),
        context: &FailureContext,
    ) -> ErrorResponse {
        let classified = ClassifiedFailure::classify(failure);
        let category = classified.category();

        self.logger.log(failure, category, context);

        FAILURES_TRANSLATED_TOTAL
            .with_label_values(&[category.code().as_str()])
            .inc();

        classified.into_response_body()
    }

    /// Overwrite whatever `writer` holds with `body`.
    ///
    /// Best-effort: write errors are logged and never propagated. If the body
    /// cannot be written the status is forced to 500.
    pub fn write_response<W: ResponseWriter>(
        &self,
        writer: &mut W,
        body: &ErrorResponse,
        context: &FailureContext,
    ) {
        if writer.is_committed() {
            warn!(
                request_id = %context.request_id,
                code = %body.code,
                "Response already started, error body is best-effort"
            );
        }

        if let Err(e) = writer.clear_body() {
            write_failed("clear_body", &e, context);
        }

        if let Err(e) = writer.set_status(body.status_code()) {
            write_failed("set_status", &e, context);
        }

        let bytes = match body.to_json_bytes() {
            Ok(bytes) => bytes,
            Err(e) => {
                write_failed("serialize", &e, context);
                force_internal_error(writer, context);
                return;
            }
        };

        if let Err(e) = writer.write_body(&bytes) {
            write_failed("write_body", &e, context);
            force_internal_error(writer, context);
        }
    }
}

fn write_failed(step: &str, err: &dyn Error, context: &FailureContext) {
    FAILURE_RESPONSE_WRITE_ERRORS_TOTAL.inc();
    warn!(
        request_id = %context.request_id,
        step = step,
        error = %err,
        "Failed to write error response"
    );
}

fn force_internal_error<W: ResponseWriter>(writer: &mut W, context: &FailureContext) {
    if let Err(e) = writer.set_status(StatusCode::INTERNAL_SERVER_ERROR) {
        debug!(
            request_id = %context.request_id,
            error = %e,
            "Could not fall back to 500 status"
        );
    }
}
