//! Command-line argument dispatch.
//!
//! This module maps validated CLI arguments to the action to run, such as
//! starting the relay server with its full configuration.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::relay;
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let relay_opts = relay::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        google_client_id: relay_opts.google_client_id,
        facebook_app_id: relay_opts.facebook_app_id,
        cookie_secure: relay_opts.cookie_secure,
        backend_timeout_seconds: relay_opts.backend_timeout_seconds,
        redirect_allowlist: relay_opts.redirect_allowlist,
    }))
}
