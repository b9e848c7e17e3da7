//! Hand-off endpoint: the explicit "return to the application" action.

use super::{
    error_status, load_relay, render_relay, see_other, session_headers, state::RelayState,
};
use crate::relay::RedirectNavigator;
use axum::{
    extract::{Extension, RawQuery},
    http::HeaderMap,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

// axum handler for hand-off
pub async fn handoff(
    relay_state: Extension<Arc<RelayState>>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    let mut relay = load_relay(&relay_state, &headers, query.as_deref());

    // Nobody signed in (cookie gone or already handed off): back to login.
    if relay.identity().is_none() {
        debug!("Hand-off requested without a session");
        return see_other(&relay.params().relay_path("/"), HeaderMap::new());
    }

    let mut navigator = RedirectNavigator::new();
    match relay.hand_off(relay_state.config().redirect_policy(), &mut navigator) {
        Ok(location) => see_other(&location, session_headers(relay.store())),
        Err(err) => render_relay(
            &relay_state,
            &relay,
            error_status(&err),
            Some(err.message()),
        ),
    }
}
