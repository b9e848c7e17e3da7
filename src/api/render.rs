//! Server-rendered relay pages.
//!
//! Pages are handlebars templates registered once at startup and rendered
//! from a serialized context, so every dynamic value is HTML-escaped.

use crate::api::handlers::state::RelayConfig;
use crate::relay::{IdentityRecord, RelayParameters, SessionState};
use anyhow::{Context, Result};
use handlebars::{Handlebars, RenderError};
use serde::Serialize;

const LAYOUT: &str = "layout";
const ALERT: &str = "alert";
const LOGIN: &str = "login";
const REVIEW: &str = "review";
const LOADING: &str = "loading";

#[derive(Serialize)]
struct LoginContext<'a> {
    title: &'static str,
    error: Option<&'a str>,
    google_client_id: Option<&'a str>,
    facebook_app_id: Option<&'a str>,
    google_action: String,
    facebook_action: String,
    email_action: String,
}

#[derive(Serialize)]
struct ReviewContext<'a> {
    title: &'static str,
    error: Option<&'a str>,
    name: &'a str,
    email: &'a str,
    avatar: Option<&'a str>,
    provider: Option<&'a str>,
    redirect_target: Option<&'a str>,
    handoff_action: String,
    logout_action: String,
}

#[derive(Serialize)]
struct LoadingContext {
    title: &'static str,
}

/// Template registry for the login, review and loading pages.
#[derive(Debug, Clone)]
pub struct Pages {
    registry: Handlebars<'static>,
}

impl Pages {
    /// # Errors
    /// Returns an error if a bundled template does not parse.
    pub fn new() -> Result<Self> {
        let mut registry = Handlebars::new();
        registry
            .register_partial(LAYOUT, include_str!("../../templates/layout.hbs"))
            .context("Failed to register layout template")?;
        registry
            .register_partial(ALERT, include_str!("../../templates/alert.hbs"))
            .context("Failed to register alert template")?;
        registry
            .register_template_string(LOGIN, include_str!("../../templates/login.hbs"))
            .context("Failed to register login template")?;
        registry
            .register_template_string(REVIEW, include_str!("../../templates/review.hbs"))
            .context("Failed to register review template")?;
        registry
            .register_template_string(LOADING, include_str!("../../templates/loading.hbs"))
            .context("Failed to register loading template")?;

        Ok(Self { registry })
    }

    /// Render the page matching the state machine's current state.
    ///
    /// # Errors
    /// Returns the template engine's error.
    pub fn state_page(
        &self,
        config: &RelayConfig,
        state: &SessionState,
        params: &RelayParameters,
        error: Option<&str>,
    ) -> Result<String, RenderError> {
        match state {
            SessionState::NoSession { error: last_error } => {
                self.login_page(config, params, error.or(last_error.as_deref()))
            }
            SessionState::Authenticating | SessionState::HandingOff => self.loading_page(),
            SessionState::Authenticated(record) => self.review_page(record, params, error),
        }
    }

    /// Login surface: provider widgets plus the email/password form.
    ///
    /// # Errors
    /// Returns the template engine's error.
    pub fn login_page(
        &self,
        config: &RelayConfig,
        params: &RelayParameters,
        error: Option<&str>,
    ) -> Result<String, RenderError> {
        self.registry.render(
            LOGIN,
            &LoginContext {
                title: "Sign in",
                error,
                google_client_id: config.google_client_id(),
                facebook_app_id: config.facebook_app_id(),
                google_action: params.relay_path("/login/google"),
                facebook_action: params.relay_path("/login/facebook"),
                email_action: params.relay_path("/login/email"),
            },
        )
    }

    /// Identity review with the explicit hand-off and logout actions.
    ///
    /// # Errors
    /// Returns the template engine's error.
    pub fn review_page(
        &self,
        record: &IdentityRecord,
        params: &RelayParameters,
        error: Option<&str>,
    ) -> Result<String, RenderError> {
        self.registry.render(
            REVIEW,
            &ReviewContext {
                title: "Signed in",
                error,
                name: &record.name,
                email: &record.email,
                avatar: record.avatar.as_deref().filter(|avatar| !avatar.is_empty()),
                provider: params.provider(),
                redirect_target: params.redirect_target(),
                handoff_action: params.relay_path("/handoff"),
                logout_action: params.relay_path("/logout"),
            },
        )
    }

    /// Transition state shown while a login or hand-off is under way.
    ///
    /// # Errors
    /// Returns the template engine's error.
    pub fn loading_page(&self) -> Result<String, RenderError> {
        self.registry
            .render(LOADING, &LoadingContext { title: "Loading" })
    }
}
