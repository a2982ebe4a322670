use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::IntoResponse,
    Json,
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};
use utoipa::ToSchema;

use super::session::session_cookie;
use super::{normalize_email, valid_email, valid_password};
use crate::auth::{Credential, IdentityRef, VerificationResult};
use crate::ensaluti::state::AuthState;

// No Debug on purpose; the payload carries a plaintext password.
#[derive(ToSchema, Serialize, Deserialize)]
pub struct UserLogin {
    pub email: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub user_id: String,
    pub email: String,
}

#[utoipa::path(
    post,
    path = "/user/login",
    request_body = UserLogin,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Validation error", body = String),
        (status = 401, description = "Unauthorized", body = String)
    ),
    tag = "auth"
)]
pub async fn login(
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<UserLogin>>,
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

    let credential = Credential::new(email, SecretString::from(request.password));

    match state.verifier().verify(&credential).await {
        Ok(VerificationResult::Success(user)) => {
            // Bind a fresh session to the user id only; the record itself is
            // re-resolved on every later request.
            let token = match state.sessions().create(IdentityRef::from(&user)).await {
                Ok(token) => token,
                Err(err) => {
                    error!("Failed to create session: {err}");
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Login failed".to_string(),
                    )
                        .into_response();
                }
            };

            let mut response_headers = HeaderMap::new();
            match session_cookie(state.config(), &token) {
                Ok(cookie) => {
                    // Attach the cookie so the browser presents it on future requests.
                    response_headers.insert(SET_COOKIE, cookie);
                    if let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}")) {
                        response_headers.insert(AUTHORIZATION, value);
                    }
                    debug!("Login successful");
                    let response = LoginResponse {
                        user_id: user.id.to_string(),
                        email: user.email,
                    };
                    (StatusCode::OK, response_headers, Json(response)).into_response()
                }
                Err(err) => {
                    error!("Failed to set session cookie: {err}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Login failed".to_string(),
                    )
                        .into_response()
                }
            }
        }
        Ok(result) => {
            debug!("Login rejected");
            // Both failure arms carry a message; the fallback never fires.
            let message = result.failure_message().unwrap_or("Invalid credentials");
            (StatusCode::UNAUTHORIZED, message.to_string()).into_response()
        }
        Err(err) => {
            error!("Login failed: {err:?}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Login failed".to_string(),
            )
                .into_response()
        }
    }
}
