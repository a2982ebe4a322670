use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use super::{normalize_email, valid_email, valid_password};
use crate::auth::CreateUserOutcome;
use crate::ensaluti::state::AuthState;

// No Debug on purpose; the payload carries a plaintext password.
#[derive(ToSchema, Serialize, Deserialize)]
pub struct UserRegister {
    pub email: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterResponse {
    pub user_id: String,
    pub email: String,
}

#[utoipa::path(
    post,
    path = "/user/register",
    request_body = UserRegister,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Validation error", body = String),
        (status = 409, description = "Email already registered", body = String)
    ),
    tag = "auth"
)]
pub async fn register(
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<UserRegister>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return (StatusCode::BAD_REQUEST, "Invalid email".to_string()).into_response();
    }

    if !valid_password(&request.password) {
        return (StatusCode::BAD_REQUEST, "Invalid password".to_string()).into_response();
    }

    // bcrypt at the configured cost is deliberately slow; keep it off the
    // async executor.
    let hasher = state.hasher();
    let password = request.password;
    let hashed = match tokio::task::spawn_blocking(move || hasher.hash(&password)).await {
        Ok(Ok(hashed)) => hashed,
        Ok(Err(err)) => {
            error!("Failed to hash password: {err:?}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Registration failed".to_string(),
            )
                .into_response();
        }
        Err(err) => {
            error!("Password hashing task failed: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Registration failed".to_string(),
            )
                .into_response();
        }
    };

    match state.users().create(&email, &hashed).await {
        Ok(CreateUserOutcome::Created(user)) => {
            let response = RegisterResponse {
                user_id: user.id.to_string(),
                email: user.email,
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Ok(CreateUserOutcome::DuplicateEmail) => (
            StatusCode::CONFLICT,
            "Email already registered".to_string(),
        )
            .into_response(),
        Err(err) => {
            error!("Failed to create user: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Registration failed".to_string(),
            )
                .into_response()
        }
    }
}
