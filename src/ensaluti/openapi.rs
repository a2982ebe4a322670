//! OpenAPI document for the HTTP surface.

use axum::Json;
use utoipa::OpenApi;

use super::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Ensaluti",
        description = "Credential verification and session authentication service",
        license(name = "BSD-3-Clause")
    ),
    paths(
        handlers::health::health,
        handlers::user_register::register,
        handlers::user_login::login,
        handlers::session::session,
        handlers::session::logout,
        handlers::profile::profile
    ),
    components(schemas(
        handlers::user_register::UserRegister,
        handlers::user_register::RegisterResponse,
        handlers::user_login::UserLogin,
        handlers::user_login::LoginResponse,
        handlers::session::SessionResponse,
        handlers::profile::ProfileResponse
    )),
    tags(
        (name = "auth", description = "Registration, login and session endpoints"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
