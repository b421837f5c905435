use std::error::Error;
use tracing::{error, warn};

use super::FailureContext;
use crate::errors::{error_chain, FailureCategory};

/// Receives every failure the translator observes, before any response is written.
pub trait FailureLogger: Send + Sync + 'static {
    fn log(
        &self,
        failure: &(dyn Error + 'static),
        category: FailureCategory,
        context: &FailureContext,
    );
}

/// Default logger emitting one `tracing` event per failure
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingFailureLogger;

impl FailureLogger for TracingFailureLogger {
    fn log(
        &self,
        failure: &(dyn Error + 'static),
        category: FailureCategory,
        context: &FailureContext,
    ) {
        let chain = error_chain(failure)
            .skip(1)
            .map(|e| e.to_string())
            .collect::<Vec<_>>();

        match category {
            FailureCategory::Validation => warn!(
                request_id = %context.request_id,
                method = %context.method,
                path = %context.path,
                category = %category,
                code = %category.code(),
                error = %failure,
                "Request failed validation"
            ),
            FailureCategory::Unhandled => error!(
                request_id = %context.request_id,
                method = %context.method,
                path = %context.path,
                category = %category,
                code = %category.code(),
                error = %failure,
                debug = ?failure,
                caused_by = ?chain,
                "Unhandled failure while processing request"
            ),
        }
    }
}
