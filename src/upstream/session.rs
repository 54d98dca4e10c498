use crate::error::GatewayError;
use crate::protocol::heck::{SessionCreateRequest, SessionCreateResponse};
use crate::transport::{HttpTransport, PreparedUpstream};

use super::error_body_preview;

/// Open a fresh anonymous upstream session titled `title` and return its id.
///
/// # Errors
///
/// - `GatewayError::UpstreamUnavailable` on connection failure or a non-success status.
/// - `GatewayError::MalformedUpstreamPayload` when the body has no string `id`.
pub async fn create_session(
    transport: &HttpTransport,
    upstream: &PreparedUpstream,
    title: &str,
) -> Result<String, GatewayError> {
    let response = transport
        .post_json(
            upstream.session_url(),
            upstream.headers(),
            &SessionCreateRequest { title },
        )
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = error_body_preview(response).await;
        tracing::warn!(status = status.as_u16(), body = %body, "session creation rejected");
        return Err(GatewayError::UpstreamUnavailable(format!(
            "session creation failed with status {}",
            status.as_u16()
        )));
    }

    let body = response.bytes().await.map_err(|err| {
        GatewayError::UpstreamUnavailable(format!("session response unreadable: {err}"))
    })?;
    let session_id = parse_session_id(&body)?;
    tracing::debug!(session_id = %session_id, "upstream session created");
    Ok(session_id)
}

fn parse_session_id(body: &[u8]) -> Result<String, GatewayError> {
    let parsed: SessionCreateResponse = serde_json::from_slice(body).map_err(|err| {
        GatewayError::MalformedUpstreamPayload(format!("session response is not JSON: {err}"))
    })?;
    parsed
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| GatewayError::MalformedUpstreamPayload("session response has no id".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_session_id() {
        assert_eq!(parse_session_id(br#"{"id":"s-1","title":"x"}"#).unwrap(), "s-1");
    }

    #[test]
    fn test_missing_or_non_string_id_is_malformed() {
        for body in [&b"{}"[..], br#"{"id":null}"#, br#"{"id":""}"#, b"not json"] {
            assert!(matches!(
                parse_session_id(body),
                Err(GatewayError::MalformedUpstreamPayload(_))
            ));
        }
    }

    #[test]
    fn test_numeric_id_is_malformed() {
        assert!(matches!(
            parse_session_id(br#"{"id":42}"#),
            Err(GatewayError::MalformedUpstreamPayload(_))
        ));
    }
}
