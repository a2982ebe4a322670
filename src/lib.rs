//! # Ensaluti (Credential Verification & Session Authentication)
//!
//! `ensaluti` authenticates users by email and password and keeps them logged
//! in across requests with an opaque session cookie.
//!
//! ## Credential verification
//!
//! Passwords are hashed with bcrypt (fresh salt per hash, tunable cost
//! factor). Login resolves the user by normalized email, verifies the
//! submitted plaintext against the stored hash, and reports a discriminated
//! outcome: success, unknown email, or wrong password.
//!
//! ## Sessions
//!
//! A successful login creates a session bound to a minimal identity
//! reference (the user id). Only a random, url-safe token crosses the wire;
//! the server stores a SHA-256 hash of it. Every request presenting the
//! token is re-resolved against the user store, so a deleted account denies
//! access immediately and its stale session is dropped.
//!
//! Session backends are pluggable: an in-memory map for tests and local
//! development, Postgres for production.

pub mod auth;
pub mod cli;
pub mod ensaluti;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
