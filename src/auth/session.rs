//! Session token storage.
//!
//! A session binds an opaque, unguessable token to an [`IdentityRef`]. Only
//! the raw token is handed to the client (cookie-safe, url-safe base64);
//! every store keys sessions by the SHA-256 hash of the token so raw values
//! never sit at rest. Lifecycle per session: created on login, resolved on
//! every request, destroyed on logout or expiry — destruction is terminal
//! and idempotent.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::Instrument;

use super::store::is_unique_violation;
use super::types::IdentityRef;

/// Attempts before giving up on generating a token the backend does not
/// already hold. A collision on 256 random bits means the RNG is broken.
const TOKEN_CREATE_ATTEMPTS: usize = 3;

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Establish a session and return the raw token for the client.
    ///
    /// The token is 32 bytes from the OS RNG, url-safe base64 without
    /// padding, so it is safe for cookie transport. A live token is never
    /// reused.
    async fn create(&self, identity: IdentityRef) -> Result<String>;

    /// Resolve a presented token to its identity, if the session is live.
    async fn resolve(&self, token: &str) -> Result<Option<IdentityRef>>;

    /// Destroy a session. Unknown or already-destroyed tokens are not an
    /// error.
    async fn destroy(&self, token: &str) -> Result<()>;
}

/// Create a new session token.
/// The raw value is only returned to set the cookie; stores keep a hash.
pub(crate) fn generate_session_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate session token")?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}

/// Hash a session token so raw values never touch the backend.
pub(crate) fn hash_session_token(token: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().to_vec()
}

struct StoredSession {
    identity: IdentityRef,
    created_at: Instant,
}

/// In-memory session store for tests and local development.
///
/// Resolution is read-mostly and takes a shared lock; create and destroy
/// take the write lock so no reader observes a half-created session.
/// Expired entries are answered as absent immediately and swept on the next
/// create.
pub struct MemorySessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<Vec<u8>, StoredSession>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, identity: IdentityRef) -> Result<String> {
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, session| session.created_at.elapsed() < self.ttl);

        for _ in 0..TOKEN_CREATE_ATTEMPTS {
            let token = generate_session_token()?;
            let token_hash = hash_session_token(&token);
            if sessions.contains_key(&token_hash) {
                continue;
            }
            sessions.insert(
                token_hash,
                StoredSession {
                    identity,
                    created_at: Instant::now(),
                },
            );
            return Ok(token);
        }

        Err(anyhow!("failed to generate unique session token"))
    }

    async fn resolve(&self, token: &str) -> Result<Option<IdentityRef>> {
        let token_hash = hash_session_token(token);
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(&token_hash)
            .filter(|session| session.created_at.elapsed() < self.ttl)
            .map(|session| session.identity))
    }

    async fn destroy(&self, token: &str) -> Result<()> {
        let token_hash = hash_session_token(token);
        self.sessions.write().await.remove(&token_hash);
        Ok(())
    }
}

/// Postgres-backed session store.
///
/// Sessions live in `user_sessions` keyed by token hash; expiry is enforced
/// in SQL so concurrent resolves and destroys stay atomic at the row level.
pub struct PgSessionStore {
    pool: PgPool,
    ttl_seconds: i64,
}

impl PgSessionStore {
    #[must_use]
    pub fn new(pool: PgPool, ttl_seconds: i64) -> Self {
        Self { pool, ttl_seconds }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, identity: IdentityRef) -> Result<String> {
        // Same sweep the memory store does: expired rows go out with every
        // login, so the table does not grow without bound.
        let query = "DELETE FROM user_sessions WHERE expires_at <= NOW()";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "DELETE",
            db.statement = query
        );
        sqlx::query(query)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to sweep expired sessions")?;

        let query = r"
            INSERT INTO user_sessions (session_hash, user_id, expires_at)
            VALUES ($1, $2, NOW() + ($3 * INTERVAL '1 second'))
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );

        for _ in 0..TOKEN_CREATE_ATTEMPTS {
            let token = generate_session_token()?;
            let token_hash = hash_session_token(&token);
            let result = sqlx::query(query)
                .bind(&token_hash)
                .bind(identity.user_id)
                .bind(self.ttl_seconds)
                .execute(&self.pool)
                .instrument(span.clone())
                .await;

            match result {
                Ok(_) => return Ok(token),
                Err(err) if is_unique_violation(&err) => {}
                Err(err) => return Err(err).context("failed to insert session"),
            }
        }

        Err(anyhow!("failed to generate unique session token"))
    }

    async fn resolve(&self, token: &str) -> Result<Option<IdentityRef>> {
        let token_hash = hash_session_token(token);

        let query = r"
            SELECT user_id
            FROM user_sessions
            WHERE session_hash = $1
              AND expires_at > NOW()
            LIMIT 1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(&token_hash)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup session")?;

        let Some(row) = row else {
            return Ok(None);
        };

        // Record activity for audit/visibility without extending the TTL.
        let query = r"
            UPDATE user_sessions
            SET last_seen_at = NOW()
            WHERE session_hash = $1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(&token_hash)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to update session last_seen_at")?;

        Ok(Some(IdentityRef {
            user_id: row.get("user_id"),
        }))
    }

    async fn destroy(&self, token: &str) -> Result<()> {
        // Logout is idempotent; it's fine if no rows are deleted.
        let token_hash = hash_session_token(token);
        let query = "DELETE FROM user_sessions WHERE session_hash = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "DELETE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(&token_hash)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to delete session")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn identity() -> IdentityRef {
        IdentityRef {
            user_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn generated_tokens_are_cookie_safe_and_unique() -> Result<()> {
        let first = generate_session_token()?;
        let second = generate_session_token()?;
        assert_ne!(first, second);
        for token in [&first, &second] {
            assert!(!token.is_empty());
            assert!(token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        }
        Ok(())
    }

    #[test]
    fn hash_session_token_stable() {
        let first = hash_session_token("token");
        let second = hash_session_token("token");
        let different = hash_session_token("other");
        assert_eq!(first, second);
        assert_ne!(first, different);
    }

    #[tokio::test]
    async fn resolve_returns_the_bound_identity() -> Result<()> {
        let store = MemorySessionStore::new(Duration::from_secs(60));
        let identity = identity();
        let token = store.create(identity).await?;
        assert_eq!(store.resolve(&token).await?, Some(identity));
        Ok(())
    }

    #[tokio::test]
    async fn destroyed_sessions_stay_destroyed() -> Result<()> {
        let store = MemorySessionStore::new(Duration::from_secs(60));
        let token = store.create(identity()).await?;

        store.destroy(&token).await?;
        assert_eq!(store.resolve(&token).await?, None);

        // Destroy is idempotent, including for tokens that never existed.
        store.destroy(&token).await?;
        store.destroy("no-such-token").await?;
        Ok(())
    }

    #[tokio::test]
    async fn expired_sessions_resolve_to_none() -> Result<()> {
        let store = MemorySessionStore::new(Duration::ZERO);
        let token = store.create(identity()).await?;
        assert_eq!(store.resolve(&token).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn create_sweeps_expired_sessions() -> Result<()> {
        let store = MemorySessionStore::new(Duration::ZERO);
        store.create(identity()).await?;
        store.create(identity()).await?;

        // Both earlier sessions expired instantly; only the newest survives.
        store.create(identity()).await?;
        assert_eq!(store.sessions.read().await.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_tokens_resolve_to_none() -> Result<()> {
        let store = MemorySessionStore::new(Duration::from_secs(60));
        assert_eq!(store.resolve("unknown").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_resolves_share_the_token() -> Result<()> {
        let store = std::sync::Arc::new(MemorySessionStore::new(Duration::from_secs(60)));
        let identity = identity();
        let token = store.create(identity).await?;

        let (first, second) = tokio::join!(store.resolve(&token), store.resolve(&token));
        assert_eq!(first?, Some(identity));
        assert_eq!(second?, Some(identity));
        Ok(())
    }
}
