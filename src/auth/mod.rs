//! Credential verification and session authentication.
//!
//! The pieces compose in one direction: [`PasswordHasher`] checks a
//! plaintext against a stored bcrypt hash, [`CredentialVerifier`] combines a
//! [`UserStore`] lookup with that check into a discriminated
//! [`VerificationResult`], [`SessionStore`] binds an opaque token to an
//! [`IdentityRef`] on success, and [`AuthenticationGate`] turns a presented
//! token back into a hydrated [`UserRecord`] or a denial.
//!
//! Stores are trait objects so the backing can be swapped: in-memory maps
//! for tests and local development, Postgres in production. Nothing in this
//! module reaches for global state.

pub mod gate;
pub mod password;
pub mod session;
pub mod store;
pub mod types;
pub mod verifier;

pub use gate::{Access, AuthenticationGate};
pub use password::PasswordHasher;
pub use session::{MemorySessionStore, PgSessionStore, SessionStore};
pub use store::{CreateUserOutcome, MemoryUserStore, PgUserStore, UserStore};
pub use types::{Credential, IdentityRef, UserRecord};
pub use verifier::{CredentialVerifier, VerificationResult};
