use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};

pub const ARG_GOOGLE_CLIENT_ID: &str = "google-client-id";
pub const ARG_FACEBOOK_APP_ID: &str = "facebook-app-id";
pub const ARG_COOKIE_SECURE: &str = "cookie-secure";
pub const ARG_BACKEND_TIMEOUT: &str = "backend-timeout";
pub const ARG_REDIRECT_ALLOWLIST: &str = "redirect-allowlist";

#[derive(Debug, Clone)]
pub struct Options {
    pub google_client_id: Option<String>,
    pub facebook_app_id: Option<String>,
    pub cookie_secure: bool,
    pub backend_timeout_seconds: u64,
    pub redirect_allowlist: Vec<String>,
}

impl Options {
    /// # Errors
    /// Returns an error if a defaulted argument is missing from the matches.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        Ok(Self {
            google_client_id: matches.get_one::<String>(ARG_GOOGLE_CLIENT_ID).cloned(),
            facebook_app_id: matches.get_one::<String>(ARG_FACEBOOK_APP_ID).cloned(),
            cookie_secure: matches.get_flag(ARG_COOKIE_SECURE),
            backend_timeout_seconds: matches
                .get_one::<u64>(ARG_BACKEND_TIMEOUT)
                .copied()
                .context("missing required argument: --backend-timeout")?,
            redirect_allowlist: matches
                .get_many::<String>(ARG_REDIRECT_ALLOWLIST)
                .map(|values| {
                    values
                        .map(|value| value.trim().to_string())
                        .filter(|value| !value.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_GOOGLE_CLIENT_ID)
                .long(ARG_GOOGLE_CLIENT_ID)
                .help("Google OAuth client id for the sign-in button")
                .env("RELAY_GOOGLE_CLIENT_ID"),
        )
        .arg(
            Arg::new(ARG_FACEBOOK_APP_ID)
                .long(ARG_FACEBOOK_APP_ID)
                .help("Facebook app id for the social login button")
                .env("RELAY_FACEBOOK_APP_ID"),
        )
        .arg(
            Arg::new(ARG_COOKIE_SECURE)
                .long(ARG_COOKIE_SECURE)
                .help("Mark the session cookie Secure (serve the relay over HTTPS)")
                .env("RELAY_COOKIE_SECURE")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(ARG_BACKEND_TIMEOUT)
                .long(ARG_BACKEND_TIMEOUT)
                .help("Timeout in seconds for one authentication backend exchange")
                .env("RELAY_BACKEND_TIMEOUT")
                .default_value("10")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new(ARG_REDIRECT_ALLOWLIST)
                .long(ARG_REDIRECT_ALLOWLIST)
                .help("Comma separated URLs allowed as hand-off targets (default: any)")
                .long_help(
                    "Comma separated absolute URLs allowed as hand-off targets. A target is allowed when it has the same origin as an entry and its path starts with the entry path. When unset, any redirect supplied by the caller is trusted.",
                )
                .env("RELAY_REDIRECT_ALLOWLIST")
                .value_delimiter(',')
                .action(ArgAction::Append),
        )
}
