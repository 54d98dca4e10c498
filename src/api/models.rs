use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Response;

use crate::api::common::ok_json_response;
use crate::error::into_axum_response;
use crate::state::AppState;

/// List the configured model aliases in `OpenAI` format.
pub fn handler(State(state): State<Arc<AppState>>, headers: &HeaderMap) -> Response {
    if let Err(err) = state.authenticate(headers) {
        return into_axum_response(&err);
    }
    ok_json_response(state.models_response_body())
}
