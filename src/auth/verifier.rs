//! Credential verification: user lookup plus password check.

use anyhow::{Context, Result};
use secrecy::ExposeSecret;
use std::sync::Arc;

use super::password::PasswordHasher;
use super::store::UserStore;
use super::types::{Credential, UserRecord};

/// Discriminated outcome of a login attempt.
///
/// Failures are values, not errors; callers pattern-match. Only
/// infrastructure trouble (store unavailable) surfaces as `Err` from
/// [`CredentialVerifier::verify`].
#[derive(Debug)]
pub enum VerificationResult {
    Success(UserRecord),
    UserNotFound,
    PasswordMismatch,
}

impl VerificationResult {
    /// User-facing message for a failed attempt.
    ///
    /// The two failure cases are deliberately distinguishable, matching the
    /// long-standing behavior of this service. It is a known
    /// username-enumeration side channel; collapse both arms into one
    /// generic message if that tradeoff is ever revisited.
    #[must_use]
    pub fn failure_message(&self) -> Option<&'static str> {
        match self {
            Self::Success(_) => None,
            Self::UserNotFound => Some("Incorrect email."),
            Self::PasswordMismatch => Some("Incorrect password."),
        }
    }
}

/// Verifies submitted credentials against the user store.
#[derive(Clone)]
pub struct CredentialVerifier {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
}

impl CredentialVerifier {
    #[must_use]
    pub fn new(users: Arc<dyn UserStore>, hasher: PasswordHasher) -> Self {
        Self { users, hasher }
    }

    /// Verify a credential.
    ///
    /// Unknown emails short-circuit without a hash comparison; there is no
    /// stored hash to compare against. The bcrypt check runs on the
    /// blocking pool so the deliberately slow work factor never stalls the
    /// executor, and no lock is held across it.
    ///
    /// # Errors
    /// Returns an error only for store or executor failures, never for bad
    /// credentials.
    pub async fn verify(&self, credential: &Credential) -> Result<VerificationResult> {
        let Some(record) = self.users.find_by_email(&credential.email).await? else {
            return Ok(VerificationResult::UserNotFound);
        };

        let hasher = self.hasher;
        let password = credential.password.clone();
        let password_hash = record.password_hash.clone();
        let matches =
            tokio::task::spawn_blocking(move || hasher.verify(password.expose_secret(), &password_hash))
                .await
                .context("password verification task failed")?;

        if matches {
            Ok(VerificationResult::Success(record))
        } else {
            Ok(VerificationResult::PasswordMismatch)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::MemoryUserStore;
    use secrecy::SecretString;

    async fn verifier_with_user(email: &str, password: &str) -> Result<CredentialVerifier> {
        let hasher = PasswordHasher::new(4);
        let users = Arc::new(MemoryUserStore::new());
        users.create(email, &hasher.hash(password)?).await?;
        Ok(CredentialVerifier::new(users, hasher))
    }

    fn credential(email: &str, password: &str) -> Credential {
        Credential::new(email, SecretString::from(password.to_string()))
    }

    #[tokio::test]
    async fn matching_credentials_verify() -> Result<()> {
        let verifier = verifier_with_user("a@b.com", "secret").await?;
        let result = verifier.verify(&credential("a@b.com", "secret")).await?;
        let VerificationResult::Success(record) = result else {
            anyhow::bail!("expected Success, got {result:?}");
        };
        assert_eq!(record.email, "a@b.com");
        Ok(())
    }

    #[tokio::test]
    async fn unknown_email_is_user_not_found() -> Result<()> {
        let verifier = verifier_with_user("a@b.com", "secret").await?;
        let result = verifier.verify(&credential("nobody@b.com", "secret")).await?;
        assert!(matches!(result, VerificationResult::UserNotFound));
        assert_eq!(result.failure_message(), Some("Incorrect email."));
        Ok(())
    }

    #[tokio::test]
    async fn wrong_password_is_a_mismatch() -> Result<()> {
        let verifier = verifier_with_user("a@b.com", "secret").await?;
        let result = verifier.verify(&credential("a@b.com", "wrong")).await?;
        assert!(matches!(result, VerificationResult::PasswordMismatch));
        assert_eq!(result.failure_message(), Some("Incorrect password."));
        Ok(())
    }

    #[tokio::test]
    async fn success_has_no_failure_message() -> Result<()> {
        let verifier = verifier_with_user("a@b.com", "secret").await?;
        let result = verifier.verify(&credential("a@b.com", "secret")).await?;
        assert_eq!(result.failure_message(), None);
        Ok(())
    }
}
