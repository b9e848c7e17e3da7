//! Login methods that exchange an external credential for an identity.
//!
//! Every variant posts its credential to the authentication backend under
//! `{auth}/api/user/auth/` and gets back the same `{ user, token? }` payload,
//! so nothing downstream branches on which provider was used.

use super::{error::RelayError, identity::IdentityRecord};
use crate::APP_USER_AGENT;
use anyhow::{Context, Result};
use axum::http::HeaderValue;
use reqwest::{
    header::{CONTENT_TYPE, COOKIE, SET_COOKIE},
    Client,
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, instrument, warn};

pub const GOOGLE_LOGIN_ROUTE: &str = "/api/user/auth/google-login";
pub const FACEBOOK_LOGIN_ROUTE: &str = "/api/user/auth/facebook-login";
pub const EMAIL_LOGIN_ROUTE: &str = "/api/user/auth/email-login";

/// Provider tag appended to the query string after a social login.
pub const FACEBOOK_PROVIDER_TAG: &str = "facebook";

pub enum LoginMethod {
    /// Google credential from the OAuth button callback.
    OAuth { credential: Option<String> },
    /// Facebook access token from the social SDK callback.
    Social { access_token: Option<String> },
    /// Email and password typed into the form.
    Password {
        email: String,
        password: SecretString,
    },
}

impl std::fmt::Debug for LoginMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OAuth { credential } => f
                .debug_struct("OAuth")
                .field("credential", &credential.as_ref().map(|_| "***"))
                .finish(),
            Self::Social { access_token } => f
                .debug_struct("Social")
                .field("access_token", &access_token.as_ref().map(|_| "***"))
                .finish(),
            Self::Password { email, .. } => f
                .debug_struct("Password")
                .field("email", email)
                .field("password", &"***")
                .finish(),
        }
    }
}

impl LoginMethod {
    #[must_use]
    pub fn oauth(credential: Option<String>) -> Self {
        Self::OAuth {
            credential: non_empty(credential),
        }
    }

    #[must_use]
    pub fn social(access_token: Option<String>) -> Self {
        Self::Social {
            access_token: non_empty(access_token),
        }
    }

    #[must_use]
    pub fn password(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Password {
            email: email.into().trim().to_string(),
            password: SecretString::from(password.into()),
        }
    }

    /// Backend route receiving this variant's credential.
    #[must_use]
    pub const fn route(&self) -> &'static str {
        match self {
            Self::OAuth { .. } => GOOGLE_LOGIN_ROUTE,
            Self::Social { .. } => FACEBOOK_LOGIN_ROUTE,
            Self::Password { .. } => EMAIL_LOGIN_ROUTE,
        }
    }

    /// Whether the exchange carries cookies in both directions.
    #[must_use]
    pub const fn uses_credentials(&self) -> bool {
        !matches!(self, Self::Social { .. })
    }

    /// Tag written into the query string after a successful login.
    #[must_use]
    pub const fn provider_tag(&self) -> Option<&'static str> {
        match self {
            Self::Social { .. } => Some(FACEBOOK_PROVIDER_TAG),
            Self::OAuth { .. } | Self::Password { .. } => None,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::OAuth { .. } => "google",
            Self::Social { .. } => "facebook",
            Self::Password { .. } => "email",
        }
    }

    /// Message used when the backend does not explain a failure.
    const fn fallback_message(&self) -> &'static str {
        match self {
            Self::OAuth { .. } => "Login failed.",
            Self::Social { .. } => "Facebook login failed",
            Self::Password { .. } => "Invalid credentials.",
        }
    }

    /// Check the user input locally and build the JSON body for the backend.
    ///
    /// # Errors
    /// `Provider` when the SDK callback produced no token, `Validation` when
    /// the email or password is empty.
    pub fn request_body(&self) -> Result<Value, RelayError> {
        match self {
            Self::OAuth { credential } => credential
                .as_ref()
                .map(|token| json!({ "token": token }))
                .ok_or_else(|| RelayError::Provider("Google login failed.".to_string())),
            Self::Social { access_token } => access_token
                .as_ref()
                .map(|token| json!({ "facebookToken": token }))
                .ok_or_else(|| RelayError::Provider("Facebook login failed".to_string())),
            Self::Password { email, password } => {
                if email.is_empty() || password.expose_secret().is_empty() {
                    return Err(RelayError::Validation(
                        "Email and password are required.".to_string(),
                    ));
                }
                Ok(json!({ "email": email, "password": password.expose_secret() }))
            }
        }
    }
}

/// Result of a successful exchange.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub user: IdentityRecord,
    /// Auxiliary token issued by the backend, if any.
    pub token: Option<String>,
    /// Backend cookies to hand to the browser (credentials mode only).
    pub set_cookies: Vec<HeaderValue>,
}

#[derive(Deserialize)]
struct ExchangeResponse {
    user: IdentityRecord,
    #[serde(default)]
    token: Option<String>,
}

#[derive(Deserialize)]
struct ErrorPayload {
    message: Option<String>,
}

/// HTTP client for the authentication backend's login routes.
#[derive(Debug, Clone)]
pub struct AuthBackend {
    client: Client,
}

impl AuthBackend {
    /// Build the pooled client; `timeout` bounds each exchange.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Failed to build authentication backend client")?;
        Ok(Self { client })
    }

    /// Post the method's credential to `{auth_base}{route}`.
    ///
    /// In credentials mode `cookies` is forwarded and the backend's
    /// `Set-Cookie` headers are returned with the exchange.
    ///
    /// # Errors
    /// `Validation`/`Provider` from local input checks (no request is sent),
    /// `Provider` for transport failures and backend rejections.
    #[instrument(skip(self, cookies), fields(provider = method.name()))]
    pub async fn exchange(
        &self,
        auth_base: &str,
        method: &LoginMethod,
        cookies: Option<&HeaderValue>,
    ) -> Result<Exchange, RelayError> {
        let body = method.request_body()?;
        let url = build_url(auth_base, method.route());

        let mut request = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .json(&body);

        if method.uses_credentials() {
            if let Some(cookies) = cookies {
                request = request.header(COOKIE, cookies.clone());
            }
        }

        let response = request.send().await.map_err(|err| {
            warn!("Login exchange with {url} failed: {err}");
            RelayError::Provider(method.fallback_message().to_string())
        })?;

        let status = response.status();
        let set_cookies = if method.uses_credentials() {
            response
                .headers()
                .get_all(SET_COOKIE)
                .iter()
                .cloned()
                .collect()
        } else {
            Vec::new()
        };
        let bytes = response.bytes().await.map_err(|err| {
            warn!("Failed to read login response from {url}: {err}");
            RelayError::Provider(method.fallback_message().to_string())
        })?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorPayload>(&bytes)
                .ok()
                .and_then(|payload| payload.message)
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| method.fallback_message().to_string());
            debug!("Backend rejected login ({status}): {message}");
            return Err(RelayError::Provider(message));
        }

        let payload: ExchangeResponse = serde_json::from_slice(&bytes).map_err(|err| {
            warn!("Unexpected login response from {url}: {err}");
            RelayError::Provider(method.fallback_message().to_string())
        })?;

        Ok(Exchange {
            user: payload.user,
            token: payload.token,
            set_cookies,
        })
    }
}

/// Join the backend base URL and a route without doubling slashes.
fn build_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    format!("{}/{}", base, path.trim_start_matches('/'))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
