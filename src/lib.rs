//! Request-pipeline stage that turns downstream failures into structured
//! JSON error responses.
//!
//! The [`translator::ExceptionTranslator`] is the core; [`translator::TranslatorLayer`]
//! installs it into any axum/tower stack.

pub mod api;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod translator;

pub use errors::{ErrorCode, ErrorResponse, Failure, ValidationFailure};
pub use translator::{ExceptionTranslator, FailureContext, FailureLogger, TranslatorLayer};
