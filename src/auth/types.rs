//! Core identity types shared across the auth modules.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User-submitted login credentials.
///
/// The plaintext password only lives for the duration of a single login
/// request and is never persisted or logged; `SecretString` redacts it from
/// `Debug` output and zeroizes it on drop.
#[derive(Debug)]
pub struct Credential {
    pub email: String,
    pub password: SecretString,
}

impl Credential {
    #[must_use]
    pub fn new(email: impl Into<String>, password: SecretString) -> Self {
        Self {
            email: email.into(),
            password,
        }
    }
}

/// A stored user account.
///
/// `password_hash` is a bcrypt string with the salt and cost factor
/// embedded. The struct deliberately does not implement `Serialize`; the
/// hash must never cross the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
}

/// Minimal serializable pointer to a user record, stored inside a session.
///
/// Holding only the id guarantees every request re-resolves the full record
/// from the user store instead of trusting a login-time snapshot.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct IdentityRef {
    pub user_id: Uuid,
}

impl From<&UserRecord> for IdentityRef {
    fn from(record: &UserRecord) -> Self {
        Self {
            user_id: record.id,
        }
    }
}
