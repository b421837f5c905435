use axum::{
    routing::{get, post},
    Json, Router,
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use super::handlers::{create_user, fail_panic, fail_unhandled, health, AppState};
use super::openapi::ApiDoc;
use crate::metrics;
use crate::translator::{ExceptionTranslator, TranslatorLayer};

pub fn create_router(state: AppState, translator: ExceptionTranslator) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health))
        // Demo endpoints
        .route("/users", post(create_user))
        .route("/fail/unhandled", get(fail_unhandled))
        .route("/fail/panic", get(fail_panic))
        // Metrics endpoint (Prometheus)
        .route("/metrics", get(metrics::metrics_handler))
        // OpenAPI documentation
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        // Order matters: the translator sits inside the trace span
        .layer(TranslatorLayer::new(translator))
        .layer(TraceLayer::new_for_http())
        // Add shared state
        .with_state(state)
}
