//! HTTP server wiring: router, middleware and the Postgres-backed stores.

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method, Request,
    },
    routing::{get, post},
    Extension, Router,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer, request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{debug_span, info, Span};
use ulid::Ulid;
use url::Url;

pub mod handlers;
mod openapi;
pub mod state;

pub use self::state::{AuthConfig, AuthState};

use crate::auth::{PgSessionStore, PgUserStore};

/// Build the application router on top of already-wired state.
pub fn router(state: Arc<AuthState>) -> Router {
    Router::new()
        // entry point; denied requests land here
        .route("/", get(|| async { env!("CARGO_PKG_NAME") }))
        .route("/user/register", post(handlers::register))
        .route("/user/login", post(handlers::login))
        .route("/user/logout", post(handlers::logout))
        .route("/user/session", get(handlers::session))
        .route("/user/profile", get(handlers::profile))
        .route("/openapi.json", get(openapi::openapi_json))
        .route(
            "/health",
            get(handlers::health).options(handlers::health),
        )
        .layer(Extension(state))
}

/// Connect to the database, assemble the middleware stack and serve until
/// interrupted.
/// # Errors
/// Returns an error if the server fails to start
pub async fn new(port: u16, dsn: String, config: AuthConfig) -> Result<()> {
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    let users = Arc::new(PgUserStore::new(pool.clone()));
    let sessions = Arc::new(PgSessionStore::new(
        pool,
        config.session_ttl_seconds(),
    ));

    // Cookies only travel cross-origin when the frontend origin is pinned and
    // credentials are allowed.
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_origin(frontend_origin(config.frontend_base_url())?)
        .allow_credentials(true);

    let state = Arc::new(AuthState::new(config, users, sessions));

    let app = router(state).layer(
        ServiceBuilder::new()
            .layer(SetRequestHeaderLayer::if_not_present(
                HeaderName::from_static("x-request-id"),
                |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
            ))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                "x-request-id",
            )))
            .layer(TraceLayer::new_for_http().make_span_with(make_span))
            .layer(cors),
    );

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

// span; headers stay out of the span so session cookies never hit the logs
fn make_span(request: &Request<Body>) -> Span {
    let path = request.uri().path();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");

    debug_span!("http-request", path, request_id)
}

fn frontend_origin(base_url: &str) -> Result<HeaderValue> {
    let url = Url::parse(base_url).context("Invalid frontend URL")?;
    HeaderValue::from_str(&url.origin().ascii_serialization())
        .context("Frontend URL is not a valid origin")
}
