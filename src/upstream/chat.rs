use std::pin::Pin;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};

use crate::error::GatewayError;
use crate::protocol::heck::HeckChatPayload;
use crate::transport::{HttpTransport, PreparedUpstream};

use super::error_body_preview;

/// Raw, unbuffered upstream chat body.
pub type UpstreamByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>;

/// Issue the streaming chat call for `prompt` inside `session_id`.
///
/// # Errors
///
/// - `GatewayError::UpstreamUnavailable` when the request cannot be sent.
/// - `GatewayError::Upstream` carrying the status when the upstream rejects it.
pub async fn invoke_chat(
    transport: &HttpTransport,
    upstream: &PreparedUpstream,
    upstream_model: &str,
    prompt: &str,
    session_id: &str,
) -> Result<UpstreamByteStream, GatewayError> {
    let payload = HeckChatPayload::new(upstream_model, prompt, upstream.language(), session_id);
    tracing::debug!(
        session_id,
        model = upstream_model,
        prompt_chars = prompt.chars().count(),
        "invoking upstream chat"
    );

    let response = transport
        .post_json(upstream.chat_url(), upstream.headers(), &payload)
        .await?;

    let status = response.status();
    if !status.is_success() {
        let message = error_body_preview(response).await;
        tracing::warn!(status = status.as_u16(), body = %message, "upstream chat rejected");
        return Err(GatewayError::Upstream {
            status: status.as_u16(),
            message,
        });
    }

    Ok(response.bytes_stream().boxed())
}
