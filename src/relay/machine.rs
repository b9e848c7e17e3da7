//! Session state machine for one visit to the relay.
//!
//! Flow Overview: `Relay::init` runs once per page load and takes the
//! "already signed in" fast path when the store holds an identity. Otherwise the
//! login surface is shown until a provider exchange succeeds. Hand-off only
//! happens on an explicit user action and ends the visit.

use super::{
    error::RelayError,
    handoff::{self, Navigator, RedirectPolicy},
    identity::IdentityRecord,
    params::RelayParameters,
    providers::{AuthBackend, Exchange, LoginMethod},
    session::SessionStore,
};
use axum::http::HeaderValue;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Login surface, with the message of the last failed attempt.
    NoSession { error: Option<String> },
    /// A provider exchange is in flight.
    Authenticating,
    /// The store holds this identity.
    Authenticated(IdentityRecord),
    /// Navigation to the caller was issued; terminal for this visit.
    HandingOff,
}

pub struct Relay<S> {
    store: S,
    params: RelayParameters,
    state: SessionState,
}

impl<S: SessionStore> Relay<S> {
    /// Evaluate the initial state for a page load.
    pub fn init(store: S, params: RelayParameters) -> Self {
        let state = match store.load() {
            Some(record) => {
                debug!("Existing session found, skipping login");
                SessionState::Authenticated(record)
            }
            None => SessionState::NoSession { error: None },
        };

        Self {
            store,
            params,
            state,
        }
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn params(&self) -> &RelayParameters {
        &self.params
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn identity(&self) -> Option<&IdentityRecord> {
        match &self.state {
            SessionState::Authenticated(record) => Some(record),
            _ => None,
        }
    }

    pub fn into_parts(self) -> (S, RelayParameters, SessionState) {
        (self.store, self.params, self.state)
    }

    /// Start an attempt: check the input locally, require `auth`, and move to
    /// `Authenticating`. Returns the backend base URL to exchange against.
    ///
    /// # Errors
    /// `Validation`/`Provider` for bad input, `Config` without `auth`. The
    /// state falls back to `NoSession` carrying the message.
    pub fn begin(&mut self, method: &LoginMethod) -> Result<String, RelayError> {
        let auth_base = method
            .request_body()
            .and_then(|_| self.params.require_auth_base().map(ToString::to_string));

        match auth_base {
            Ok(auth_base) => {
                self.state = SessionState::Authenticating;
                Ok(auth_base)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Apply the outcome of an exchange. On success the identity is stored
    /// first, then the query string is rewritten with the provider tag.
    ///
    /// # Errors
    /// Returns the exchange error, or the store's error when the identity
    /// cannot be kept, after resetting to `NoSession`.
    pub fn complete(
        &mut self,
        method: &LoginMethod,
        outcome: Result<Exchange, RelayError>,
    ) -> Result<Exchange, RelayError> {
        match outcome {
            Ok(exchange) => {
                if let Err(err) = self.store.save(&exchange.user) {
                    return Err(self.fail(err));
                }
                self.params.persist(method.provider_tag());
                info!(provider = method.name(), "Login succeeded");
                self.state = SessionState::Authenticated(exchange.user.clone());
                Ok(exchange)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Run one provider exchange end to end. The user may retry any number of
    /// times; the most recent success wins.
    ///
    /// # Errors
    /// See [`Relay::begin`] and [`AuthBackend::exchange`].
    pub async fn login(
        &mut self,
        backend: &AuthBackend,
        method: &LoginMethod,
        cookies: Option<&HeaderValue>,
    ) -> Result<Exchange, RelayError> {
        let auth_base = self.begin(method)?;
        let outcome = backend.exchange(&auth_base, method, cookies).await;
        self.complete(method, outcome)
    }

    /// Forget the identity and return to the login surface, keeping
    /// `redirect`/`auth` but dropping the provider tag.
    pub fn logout(&mut self) {
        self.store.clear();
        self.params.drop_provider();
        self.state = SessionState::NoSession { error: None };
        info!("Logged out");
    }

    /// Hand the identity to the caller. Only valid from `Authenticated`.
    ///
    /// # Errors
    /// `Validation` when nobody is signed in, `Config` for a missing or
    /// forbidden `redirect`; the state and store are left unchanged.
    pub fn hand_off<N: Navigator>(
        &mut self,
        policy: &RedirectPolicy,
        navigator: &mut N,
    ) -> Result<String, RelayError> {
        if !matches!(self.state, SessionState::Authenticated(_)) {
            return Err(RelayError::Validation(
                "Sign in before returning to the application.".to_string(),
            ));
        }

        let location = handoff::perform(
            &mut self.store,
            self.params.redirect_target(),
            policy,
            navigator,
        )?;
        self.state = SessionState::HandingOff;
        Ok(location)
    }

    fn fail(&mut self, err: RelayError) -> RelayError {
        debug!("Login attempt failed: {err}");
        self.state = SessionState::NoSession {
            error: Some(err.message().to_string()),
        };
        err
    }
}
