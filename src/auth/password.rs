//! One-way salted password hashing.

use anyhow::{Context, Result};

/// Default bcrypt cost factor.
pub const DEFAULT_COST: u32 = 10;

/// bcrypt hasher with a tunable work factor.
///
/// Hashing is CPU-bound by design; the cost factor trades login latency for
/// offline brute-force resistance. Callers on async paths should run
/// [`hash`](Self::hash) and [`verify`](Self::verify) through
/// `spawn_blocking` so the executor is not stalled for tens of
/// milliseconds.
#[derive(Clone, Copy, Debug)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl PasswordHasher {
    #[must_use]
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    #[must_use]
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a plaintext with a fresh random salt.
    ///
    /// Two calls with the same plaintext return different strings; the salt
    /// and cost factor are embedded in the output so `verify` needs no
    /// extra parameters.
    ///
    /// # Errors
    /// Returns an error if the cost factor is outside bcrypt's 4-31 range.
    pub fn hash(&self, plaintext: &str) -> Result<String> {
        bcrypt::hash(plaintext, self.cost).context("failed to hash password")
    }

    /// Check a plaintext against a stored hash.
    ///
    /// Recomputes the hash with the salt and parameters embedded in
    /// `hashed` and compares in constant time. A malformed hash counts as a
    /// mismatch rather than an error; there is nothing the caller could do
    /// differently, and login must not distinguish the two cases.
    #[must_use]
    pub fn verify(&self, plaintext: &str, hashed: &str) -> bool {
        bcrypt::verify(plaintext, hashed).unwrap_or(false)
    }
}
