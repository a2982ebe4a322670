pub mod health;
pub use self::health::health;

pub mod user_register;
pub use self::user_register::register;

pub mod user_login;
pub use self::user_login::login;

pub mod session;
pub use self::session::{logout, session};

pub mod profile;
pub use self::profile::profile;

#[cfg(test)]
pub(crate) mod test_support;


// common functions for the handlers
use regex::Regex;

/// Normalize an email for lookup/uniqueness checks.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email))
}

/// Accept any non-empty password that fits in bcrypt's 72-byte input limit.
pub fn valid_password(password: &str) -> bool {
    !password.is_empty() && password.len() <= 72
}
