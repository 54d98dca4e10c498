//! Response helpers shared by the handlers.

mod cors;
mod non_streaming;
mod streaming;

pub use cors::{apply_cors_headers, preflight_response};
pub(crate) use non_streaming::{aggregate_completion, ok_json_response};
pub(crate) use streaming::sse_ok_response;

/// Response header carrying the upstream session id of a chat request.
pub const SESSION_ID_HEADER: &str = "x-heck-session-id";
