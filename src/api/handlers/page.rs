use super::{load_relay, render_relay, state::RelayState};
use axum::{
    extract::{Extension, RawQuery},
    http::{HeaderMap, StatusCode},
    response::Response,
};
use std::sync::Arc;

// axum handler for the relay page: login surface or identity review
pub async fn page(
    relay_state: Extension<Arc<RelayState>>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    let relay = load_relay(&relay_state, &headers, query.as_deref());
    render_relay(&relay_state, &relay, StatusCode::OK, None)
}
