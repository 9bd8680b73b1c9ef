//! CORS preflight handler

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};

use crate::state::AppState;

/// OPTIONS <endpoint>/<anything>: configured CORS headers, empty body
pub async fn preflight(State(state): State<AppState>) -> (StatusCode, HeaderMap) {
    let configured = state.headers();

    let mut headers = HeaderMap::new();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, configured.allow_origin.clone());
    headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, configured.allow_methods.clone());
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, configured.allow_headers.clone());
    headers.insert(header::ACCEPT, configured.accept.clone());
    headers.insert(header::CACHE_CONTROL, configured.cache_control.clone());

    (StatusCode::OK, headers)
}
