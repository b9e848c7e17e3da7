use crate::api::{
    self,
    handlers::state::{RelayConfig, RelayState},
};
use crate::relay::RedirectPolicy;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub google_client_id: Option<String>,
    pub facebook_app_id: Option<String>,
    pub cookie_secure: bool,
    pub backend_timeout_seconds: u64,
    pub redirect_allowlist: Vec<String>,
}

/// Build the relay configuration from the CLI arguments.
#[must_use]
pub fn config(args: Args) -> RelayConfig {
    let policy = RedirectPolicy::from_entries(&args.redirect_allowlist);
    if policy.is_permissive() {
        warn!("No redirect allow-list configured: identities are handed to any caller-supplied redirect");
    }

    RelayConfig::new()
        .with_google_client_id(args.google_client_id)
        .with_facebook_app_id(args.facebook_app_id)
        .with_cookie_secure(args.cookie_secure)
        .with_backend_timeout_seconds(args.backend_timeout_seconds)
        .with_redirect_policy(policy)
}

/// Execute the server action.
/// # Errors
/// Returns an error if the backend client cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let port = args.port;
    let relay_config = config(args);

    debug!("Relay config: {:?}", relay_config);

    let relay_state =
        Arc::new(RelayState::new(relay_config).context("Failed to initialize relay state")?);

    api::new(port, relay_state).await
}
