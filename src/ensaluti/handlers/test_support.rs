//! Shared fixtures for handler tests: in-memory stores behind real state.

use anyhow::{bail, Result};
use axum::http::{header::COOKIE, header::SET_COOKIE, HeaderMap, HeaderValue};
use axum::response::Response;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{
    CreateUserOutcome, IdentityRef, MemorySessionStore, MemoryUserStore, SessionStore, UserRecord,
    UserStore,
};
use crate::ensaluti::state::{AuthConfig, AuthState};

pub(crate) struct Fixture {
    pub state: Arc<AuthState>,
    pub users: Arc<MemoryUserStore>,
    pub sessions: Arc<MemorySessionStore>,
}

pub(crate) struct UserFixture {
    pub state: Arc<AuthState>,
    pub users: Arc<MemoryUserStore>,
    pub sessions: Arc<MemorySessionStore>,
    pub user: UserRecord,
}

impl UserFixture {
    /// Establish a session for the fixture user, as a successful login would.
    pub(crate) async fn login(&self) -> Result<String> {
        self.sessions.create(IdentityRef::from(&self.user)).await
    }
}

/// State over empty in-memory stores. Minimum bcrypt cost keeps tests fast.
pub(crate) fn fixture() -> Fixture {
    let users = Arc::new(MemoryUserStore::new());
    let sessions = Arc::new(MemorySessionStore::new(Duration::from_secs(60)));
    let config = AuthConfig::new("http://localhost:3000".to_string()).with_hash_cost(4);
    let state = Arc::new(AuthState::new(config, users.clone(), sessions.clone()));
    Fixture {
        state,
        users,
        sessions,
    }
}

/// State with one registered user whose password is already hashed.
pub(crate) async fn fixture_with_user(email: &str, password: &str) -> Result<UserFixture> {
    let Fixture {
        state,
        users,
        sessions,
    } = fixture();

    let hashed = state.hasher().hash(password)?;
    let CreateUserOutcome::Created(user) = users.create(email, &hashed).await? else {
        bail!("expected user creation to succeed");
    };

    Ok(UserFixture {
        state,
        users,
        sessions,
        user,
    })
}

/// Pull the session token out of a login response's Set-Cookie header.
pub(crate) fn cookie_token(response: &Response) -> Option<String> {
    let cookie = response.headers().get(SET_COOKIE)?.to_str().ok()?;
    let name_value = cookie.split(';').next()?;
    let (name, value) = name_value.split_once('=')?;
    (name == "ensaluti_session" && !value.is_empty()).then(|| value.to_string())
}

/// Request headers presenting a session cookie.
pub(crate) fn headers_with_token(token: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(
        COOKIE,
        HeaderValue::from_str(&format!("ensaluti_session={token}"))?,
    );
    Ok(headers)
}
