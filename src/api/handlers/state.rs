//! Relay configuration and shared handler state.

use crate::api::render::Pages;
use crate::relay::{AuthBackend, RedirectPolicy};
use anyhow::Result;
use std::time::Duration;

const DEFAULT_BACKEND_TIMEOUT_SECONDS: u64 = 10;

#[derive(Clone, Debug)]
pub struct RelayConfig {
    google_client_id: Option<String>,
    facebook_app_id: Option<String>,
    cookie_secure: bool,
    backend_timeout_seconds: u64,
    redirect_policy: RedirectPolicy,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RelayConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            google_client_id: None,
            facebook_app_id: None,
            cookie_secure: false,
            backend_timeout_seconds: DEFAULT_BACKEND_TIMEOUT_SECONDS,
            redirect_policy: RedirectPolicy::permissive(),
        }
    }

    #[must_use]
    pub fn with_google_client_id(mut self, client_id: Option<String>) -> Self {
        self.google_client_id = client_id.filter(|id| !id.trim().is_empty());
        self
    }

    #[must_use]
    pub fn with_facebook_app_id(mut self, app_id: Option<String>) -> Self {
        self.facebook_app_id = app_id.filter(|id| !id.trim().is_empty());
        self
    }

    #[must_use]
    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    #[must_use]
    pub fn with_backend_timeout_seconds(mut self, seconds: u64) -> Self {
        self.backend_timeout_seconds = seconds.max(1);
        self
    }

    #[must_use]
    pub fn with_redirect_policy(mut self, policy: RedirectPolicy) -> Self {
        self.redirect_policy = policy;
        self
    }

    #[must_use]
    pub fn google_client_id(&self) -> Option<&str> {
        self.google_client_id.as_deref()
    }

    #[must_use]
    pub fn facebook_app_id(&self) -> Option<&str> {
        self.facebook_app_id.as_deref()
    }

    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }

    #[must_use]
    pub fn backend_timeout(&self) -> Duration {
        Duration::from_secs(self.backend_timeout_seconds)
    }

    #[must_use]
    pub fn redirect_policy(&self) -> &RedirectPolicy {
        &self.redirect_policy
    }
}

/// Configuration, the pooled backend client and the page templates, shared
/// by all requests.
#[derive(Debug)]
pub struct RelayState {
    config: RelayConfig,
    backend: AuthBackend,
    pages: Pages,
}

impl RelayState {
    /// # Errors
    /// Returns an error if the backend HTTP client cannot be built or a page
    /// template does not parse.
    pub fn new(config: RelayConfig) -> Result<Self> {
        let backend = AuthBackend::new(config.backend_timeout())?;
        let pages = Pages::new()?;
        Ok(Self {
            config,
            backend,
            pages,
        })
    }

    #[must_use]
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    #[must_use]
    pub fn backend(&self) -> &AuthBackend {
        &self.backend
    }

    #[must_use]
    pub fn pages(&self) -> &Pages {
        &self.pages
    }
}
