//! Login endpoints, one per provider variant.
//!
//! Flow Overview: the provider widget (or the email form) posts its credential
//! here with the relay parameters still in the query string. A successful
//! exchange stores the identity cookie first, then redirects to the relay page
//! with the rewritten query string. Failures render the login page inline.

use super::{error_status, load_relay, render_relay, see_other, session_headers, state::RelayState};
use crate::relay::{session::forwardable_cookies, LoginMethod};
use axum::{
    extract::{Extension, RawQuery},
    http::{header::SET_COOKIE, HeaderMap},
    response::Response,
    Form,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

#[derive(Deserialize, Debug, Default)]
pub struct GoogleLogin {
    #[serde(default)]
    credential: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct FacebookLogin {
    #[serde(default)]
    access_token: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct EmailLogin {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

// axum handler for the Google credential callback
#[instrument(skip_all)]
pub async fn google(
    relay_state: Extension<Arc<RelayState>>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    Form(form): Form<GoogleLogin>,
) -> Response {
    let method = LoginMethod::oauth(form.credential);
    attempt(&relay_state, &headers, query.as_deref(), method).await
}

// axum handler for the Facebook access token callback
#[instrument(skip_all)]
pub async fn facebook(
    relay_state: Extension<Arc<RelayState>>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    Form(form): Form<FacebookLogin>,
) -> Response {
    let method = LoginMethod::social(form.access_token);
    attempt(&relay_state, &headers, query.as_deref(), method).await
}

// axum handler for the email/password form
#[instrument(skip_all)]
pub async fn email(
    relay_state: Extension<Arc<RelayState>>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    Form(form): Form<EmailLogin>,
) -> Response {
    let method = LoginMethod::password(form.email, form.password);
    attempt(&relay_state, &headers, query.as_deref(), method).await
}

async fn attempt(
    relay_state: &RelayState,
    headers: &HeaderMap,
    query: Option<&str>,
    method: LoginMethod,
) -> Response {
    let mut relay = load_relay(relay_state, headers, query);
    let cookies = forwardable_cookies(headers);

    match relay
        .login(relay_state.backend(), &method, cookies.as_ref())
        .await
    {
        Ok(exchange) => {
            let mut response_headers = session_headers(relay.store());
            for cookie in exchange.set_cookies {
                response_headers.append(SET_COOKIE, cookie);
            }
            see_other(&relay.params().relay_path("/"), response_headers)
        }
        Err(err) => render_relay(relay_state, &relay, error_status(&err), None),
    }
}
