//! Shared service state and configuration.

use std::sync::Arc;

use crate::auth::{
    AuthenticationGate, CredentialVerifier, PasswordHasher, SessionStore, UserStore,
};

const DEFAULT_SESSION_TTL_SECONDS: i64 = 12 * 60 * 60;
const DEFAULT_HASH_COST: u32 = crate::auth::password::DEFAULT_COST;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    frontend_base_url: String,
    session_ttl_seconds: i64,
    hash_cost: u32,
}

impl AuthConfig {
    #[must_use]
    pub fn new(frontend_base_url: String) -> Self {
        Self {
            frontend_base_url,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            hash_cost: DEFAULT_HASH_COST,
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    #[must_use]
    pub fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub fn hash_cost(&self) -> u32 {
        self.hash_cost
    }

    /// Only mark cookies secure when the frontend is served over HTTPS.
    #[must_use]
    pub fn session_cookie_secure(&self) -> bool {
        self.frontend_base_url.starts_with("https://")
    }
}

/// Everything the handlers need, injected once at startup.
pub struct AuthState {
    config: AuthConfig,
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
    hasher: PasswordHasher,
    verifier: CredentialVerifier,
    gate: AuthenticationGate,
}

impl AuthState {
    #[must_use]
    pub fn new(
        config: AuthConfig,
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        let hasher = PasswordHasher::new(config.hash_cost());
        let verifier = CredentialVerifier::new(users.clone(), hasher);
        let gate = AuthenticationGate::new(users.clone(), sessions.clone());
        Self {
            config,
            users,
            sessions,
            hasher,
            verifier,
            gate,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn users(&self) -> &dyn UserStore {
        self.users.as_ref()
    }

    #[must_use]
    pub fn sessions(&self) -> &dyn SessionStore {
        self.sessions.as_ref()
    }

    #[must_use]
    pub fn hasher(&self) -> PasswordHasher {
        self.hasher
    }

    #[must_use]
    pub fn verifier(&self) -> &CredentialVerifier {
        &self.verifier
    }

    #[must_use]
    pub fn gate(&self) -> &AuthenticationGate {
        &self.gate
    }
}
