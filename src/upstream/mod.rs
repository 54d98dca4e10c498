//! Calls made to the Heck upstream: session bootstrap and the streaming chat request.

mod chat;
mod session;

pub use chat::{invoke_chat, UpstreamByteStream};
pub use session::create_session;

/// Longest upstream error body kept for an error message.
const ERROR_BODY_PREVIEW_BYTES: usize = 512;

async fn error_body_preview(response: reqwest::Response) -> String {
    match response.bytes().await {
        Ok(body) => {
            let end = body.len().min(ERROR_BODY_PREVIEW_BYTES);
            String::from_utf8_lossy(&body[..end]).into_owned()
        }
        Err(err) => format!("<unreadable body: {err}>"),
    }
}
