//! Example protected route: the gate runs before the handler logic.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use super::session::extract_session_token;
use crate::auth::Access;
use crate::ensaluti::state::AuthState;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ProfileResponse {
    pub user_id: String,
    pub email: String,
}

#[utoipa::path(
    get,
    path = "/user/profile",
    responses(
        (status = 200, description = "Profile of the logged-in user", body = ProfileResponse),
        (status = 303, description = "Not logged in, redirected to the entry point")
    ),
    tag = "auth"
)]
pub async fn profile(headers: HeaderMap, state: Extension<Arc<AuthState>>) -> impl IntoResponse {
    let token = extract_session_token(&headers);
    match state.gate().check(token.as_deref()).await {
        Ok(Access::Permit(user)) => {
            let response = ProfileResponse {
                user_id: user.id.to_string(),
                email: user.email,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        // Denied requests bounce to the entry point instead of erroring.
        Ok(Access::Deny) => Redirect::to("/").into_response(),
        Err(err) => {
            error!("Failed to check session: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
