//! Relay route handlers and the helpers they share.
//!
//! Every handler treats its request as one page load: it rebuilds the relay
//! parameters from the query string and the session store from the request
//! cookies, drives the state machine, and answers with either a rendered page
//! or a `303 See Other` carrying the rewritten URL.

pub mod handoff;
pub mod health;
pub mod login;
pub mod logout;
pub mod page;
pub mod state;

use crate::relay::{CookieSessionStore, Relay, RelayError, RelayParameters};
use axum::{
    http::{
        header::{LOCATION, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{Html, IntoResponse, Response},
};
use tracing::error;

use self::state::RelayState;

/// Build the relay for one page load.
pub(crate) fn load_relay(
    relay_state: &RelayState,
    headers: &HeaderMap,
    query: Option<&str>,
) -> Relay<CookieSessionStore> {
    let params = RelayParameters::resolve(query);
    let store = CookieSessionStore::from_headers(headers, relay_state.config().cookie_secure());
    Relay::init(store, params)
}

/// Status used when an error is rendered inline.
pub(crate) const fn error_status(err: &RelayError) -> StatusCode {
    match err {
        RelayError::Config(_) => StatusCode::BAD_REQUEST,
        RelayError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        RelayError::Provider(_) => StatusCode::UNAUTHORIZED,
    }
}

/// Render the page for the relay's current state.
pub(crate) fn render_relay(
    relay_state: &RelayState,
    relay: &Relay<CookieSessionStore>,
    status: StatusCode,
    error: Option<&str>,
) -> Response {
    match relay_state
        .pages()
        .state_page(relay_state.config(), relay.state(), relay.params(), error)
    {
        Ok(html) => (status, Html(html)).into_response(),
        Err(err) => {
            error!("Failed to render relay page: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// `Set-Cookie` headers staged by the session store.
pub(crate) fn session_headers(store: &CookieSessionStore) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Some(cookie) = store.set_cookie() {
        headers.append(SET_COOKIE, cookie.clone());
    }
    headers
}

/// `303 See Other` to `location` with the given extra headers.
pub(crate) fn see_other(location: &str, mut headers: HeaderMap) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => {
            headers.insert(LOCATION, value);
            (StatusCode::SEE_OTHER, headers).into_response()
        }
        Err(err) => {
            error!("Invalid redirect location {location}: {err}");
            StatusCode::BAD_REQUEST.into_response()
        }
    }
}
