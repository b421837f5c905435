use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::Failure;

lazy_static::lazy_static! {
    static ref START_TIME: Instant = Instant::now();
}

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub instance_id: String,
}

/// Body accepted by `POST /users`
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub age: u8,
}

impl CreateUserRequest {
    /// Check every field and report all problems at once
    fn validate(self) -> Result<User, Failure> {
        let mut errors = Vec::new();

        let name = self.name.unwrap_or_default().trim().to_string();
        if name.is_empty() {
            errors.push("name is required".to_string());
        }

        let email = self.email.unwrap_or_default();
        if !email.contains('@') {
            errors.push("email must be a valid address".to_string());
        }

        let age = match self.age {
            Some(age) if (0..=150).contains(&age) => age as u8,
            Some(_) => {
                errors.push("age must be between 0 and 150".to_string());
                0
            }
            None => {
                errors.push("age is required".to_string());
                0
            }
        };

        if !errors.is_empty() {
            return Err(Failure::validation(errors));
        }

        Ok(User {
            id: Uuid::new_v4(),
            name,
            email,
            age,
        })
    }
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = serde_json::Value)
    )
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "failure-translator",
        "version": env!("CARGO_PKG_VERSION"),
        "instance_id": state.instance_id,
        "uptime_seconds": START_TIME.elapsed().as_secs(),
    }))
}

/// Create a user, rejecting invalid input with a validation failure
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Validation errors", body = crate::errors::ErrorResponse),
        (status = 500, description = "Unhandled error", body = crate::errors::ErrorResponse)
    )
)]
pub async fn create_user(
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), Failure> {
    let Json(request) = payload.map_err(|rejection| Failure::validation([rejection.body_text()]))?;
    let user = request.validate()?;

    info!(user_id = %user.id, "Created user");

    Ok((StatusCode::CREATED, Json(user)))
}

/// Always fails with an internal error whose detail must stay server-side
#[utoipa::path(
    get,
    path = "/fail/unhandled",
    tag = "diagnostics",
    responses(
        (status = 500, description = "Unhandled error", body = crate::errors::ErrorResponse)
    )
)]
pub async fn fail_unhandled() -> Result<Json<serde_json::Value>, Failure> {
    Err(Failure::unhandled(std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        "connection to postgres://admin:hunter2@db:5432 refused",
    )))
}

/// Panics while handling the request
#[utoipa::path(
    get,
    path = "/fail/panic",
    tag = "diagnostics",
    responses(
        (status = 500, description = "Unhandled error", body = crate::errors::ErrorResponse)
    )
)]
pub async fn fail_panic() -> Json<serde_json::Value> {
    let items: Vec<u32> = Vec::new();
    Json(serde_json::json!({ "first": items[0] }))
}
