use utoipa::OpenApi;

use crate::api::handlers::{CreateUserRequest, User};
use crate::errors::{ErrorCode, ErrorResponse};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Failure Translator",
        version = "0.1.0",
        description = "Demo service for the failure-translating request pipeline stage. Every failed request answers with the same structured error body.",
    ),
    paths(
        crate::api::handlers::health,
        crate::api::handlers::create_user,
        crate::api::handlers::fail_unhandled,
        crate::api::handlers::fail_panic,
    ),
    components(
        schemas(
            ErrorResponse,
            ErrorCode,
            CreateUserRequest,
            User,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "Endpoints with input validation"),
        (name = "diagnostics", description = "Endpoints that always fail"),
    )
)]
pub struct ApiDoc;
