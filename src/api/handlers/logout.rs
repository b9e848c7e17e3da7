use super::{load_relay, see_other, session_headers, state::RelayState};
use axum::{
    extract::{Extension, RawQuery},
    http::HeaderMap,
    response::Response,
};
use std::sync::Arc;

// axum handler for logout; always clears the cookie, even if nothing was stored
pub async fn logout(
    relay_state: Extension<Arc<RelayState>>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    let mut relay = load_relay(&relay_state, &headers, query.as_deref());
    relay.logout();
    see_other(
        &relay.params().relay_path("/"),
        session_headers(relay.store()),
    )
}
