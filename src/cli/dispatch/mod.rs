//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to the appropriate action, such as starting
//! the server with its full configuration.

use crate::cli::actions::{server::Args, Action};
use anyhow::{bail, Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;
    let frontend_base_url = matches
        .get_one::<String>("frontend-url")
        .cloned()
        .unwrap_or_else(|| "http://localhost:3000".to_string());
    let session_ttl_seconds = matches
        .get_one::<i64>("session-ttl")
        .copied()
        .unwrap_or(43200);
    let hash_cost = matches.get_one::<u32>("hash-cost").copied().unwrap_or(10);

    if session_ttl_seconds <= 0 {
        bail!("--session-ttl must be positive");
    }

    // bcrypt only accepts cost factors in this range
    if !(4..=31).contains(&hash_cost) {
        bail!("--hash-cost must be between 4 and 31");
    }

    Ok(Action::Server(Args {
        port,
        dsn,
        frontend_base_url,
        session_ttl_seconds,
        hash_cost,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;

    fn matches_from(args: &[&str]) -> clap::ArgMatches {
        let mut full = vec!["ensaluti", "--dsn", "postgres://localhost/ensaluti"];
        full.extend_from_slice(args);
        commands::new().get_matches_from(full)
    }

    #[test]
    fn handler_defaults() -> Result<()> {
        let matches = matches_from(&[]);
        let Action::Server(args) = handler(&matches)?;
        assert_eq!(args.port, 8080);
        assert_eq!(args.dsn, "postgres://localhost/ensaluti");
        assert_eq!(args.frontend_base_url, "http://localhost:3000");
        assert_eq!(args.session_ttl_seconds, 43200);
        assert_eq!(args.hash_cost, 10);
        Ok(())
    }

    #[test]
    fn handler_rejects_out_of_range_hash_cost() {
        let matches = matches_from(&["--hash-cost", "3"]);
        assert!(handler(&matches).is_err());

        let matches = matches_from(&["--hash-cost", "32"]);
        assert!(handler(&matches).is_err());
    }

    #[test]
    fn handler_rejects_non_positive_session_ttl() {
        let matches = matches_from(&["--session-ttl", "0"]);
        assert!(handler(&matches).is_err());

        let matches = matches_from(&["--session-ttl", "-1"]);
        assert!(handler(&matches).is_err());
    }
}
