//! Per-request access gate for protected routes.

use anyhow::Result;
use std::sync::Arc;

use super::session::SessionStore;
use super::store::UserStore;
use super::types::UserRecord;

/// Gate decision for a single request.
///
/// `Permit` carries the freshly hydrated user record for the handler; it is
/// scoped to the request and never persisted.
#[derive(Debug)]
pub enum Access {
    Permit(UserRecord),
    Deny,
}

/// Checks the session token presented with a request.
///
/// Consulted before every protected operation. On `Deny` the caller
/// redirects to an unauthenticated entry point rather than erroring.
#[derive(Clone)]
pub struct AuthenticationGate {
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
}

impl AuthenticationGate {
    #[must_use]
    pub fn new(users: Arc<dyn UserStore>, sessions: Arc<dyn SessionStore>) -> Self {
        Self { users, sessions }
    }

    /// Resolve the request's token to a permit or denial.
    ///
    /// Missing and unresolvable tokens deny. A token whose user no longer
    /// exists denies and destroys the stale session, so later resolves of
    /// the same token are absent. A permit always re-hydrates the record
    /// from the user store; the session never caches user state.
    ///
    /// # Errors
    /// Returns an error only when a backing store fails.
    pub async fn check(&self, token: Option<&str>) -> Result<Access> {
        let Some(token) = token else {
            return Ok(Access::Deny);
        };

        let Some(identity) = self.sessions.resolve(token).await? else {
            return Ok(Access::Deny);
        };

        match self.users.find_by_id(identity.user_id).await? {
            Some(record) => Ok(Access::Permit(record)),
            None => {
                // User deleted after login; the session is stale.
                self.sessions.destroy(token).await?;
                Ok(Access::Deny)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::session::MemorySessionStore;
    use crate::auth::store::{CreateUserOutcome, MemoryUserStore};
    use crate::auth::types::IdentityRef;
    use std::time::Duration;

    struct Fixture {
        users: Arc<MemoryUserStore>,
        sessions: Arc<MemorySessionStore>,
        gate: AuthenticationGate,
    }

    fn fixture() -> Fixture {
        let users = Arc::new(MemoryUserStore::new());
        let sessions = Arc::new(MemorySessionStore::new(Duration::from_secs(60)));
        let gate = AuthenticationGate::new(users.clone(), sessions.clone());
        Fixture {
            users,
            sessions,
            gate,
        }
    }

    async fn login(fixture: &Fixture, email: &str) -> Result<(UserRecord, String)> {
        let CreateUserOutcome::Created(record) =
            fixture.users.create(email, "$2b$10$hash").await?
        else {
            anyhow::bail!("expected Created");
        };
        let token = fixture.sessions.create(IdentityRef::from(&record)).await?;
        Ok((record, token))
    }

    #[tokio::test]
    async fn missing_token_denies() -> Result<()> {
        let fixture = fixture();
        assert!(matches!(fixture.gate.check(None).await?, Access::Deny));
        Ok(())
    }

    #[tokio::test]
    async fn unknown_token_denies() -> Result<()> {
        let fixture = fixture();
        let access = fixture.gate.check(Some("no-such-token")).await?;
        assert!(matches!(access, Access::Deny));
        Ok(())
    }

    #[tokio::test]
    async fn live_session_permits_with_the_hydrated_record() -> Result<()> {
        let fixture = fixture();
        let (record, token) = login(&fixture, "alice@example.com").await?;

        let access = fixture.gate.check(Some(&token)).await?;
        let Access::Permit(hydrated) = access else {
            anyhow::bail!("expected Permit");
        };
        assert_eq!(hydrated, record);
        Ok(())
    }

    #[tokio::test]
    async fn deleted_user_denies_and_destroys_the_session() -> Result<()> {
        let fixture = fixture();
        let (record, token) = login(&fixture, "alice@example.com").await?;

        fixture.users.remove(record.id).await;

        let access = fixture.gate.check(Some(&token)).await?;
        assert!(matches!(access, Access::Deny));

        // Side effect: the stale session is gone for good.
        assert_eq!(fixture.sessions.resolve(&token).await?, None);
        Ok(())
    }
}
