//! `POST /v1/chat/completions`: bootstrap a session, invoke the upstream and translate
//! its marker stream.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Response;

use crate::api::common::{aggregate_completion, ok_json_response, sse_ok_response, SESSION_ID_HEADER};
use crate::error::{into_axum_response, GatewayError};
use crate::protocol::heck::normalize_messages;
use crate::protocol::openai_chat::OpenAiChatRequest;
use crate::state::AppState;
use crate::stream::{emit_sse, translate_stream, StreamTranslator};
use crate::upstream::{create_session, invoke_chat};
use crate::util::unix_now_secs;

pub async fn handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: bytes::Bytes,
) -> Response {
    match handler_inner(state, &headers, &body).await {
        Ok(response) => response,
        Err(err) => into_axum_response(&err),
    }
}

fn parse_request(body: &[u8]) -> Result<OpenAiChatRequest, GatewayError> {
    serde_json::from_slice(body)
        .map_err(|err| GatewayError::InvalidRequest(format!("Invalid chat completion body: {err}")))
}

async fn handler_inner(
    state: Arc<AppState>,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<Response, GatewayError> {
    state.authenticate(headers)?;
    let request = parse_request(body)?;

    let alias = request
        .model
        .as_deref()
        .map(str::trim)
        .filter(|model| !model.is_empty())
        .unwrap_or(state.config.models.default_alias.as_str())
        .to_string();
    let resolved = state.model_router.resolve(&alias);
    let normalized = normalize_messages(&request.messages, state.config.upstream.title_max_chars);
    let request_id = state.next_request_id();
    let stream_mode = request.stream.unwrap_or(true);

    tracing::debug!(
        request_id = %request_id,
        model = %alias,
        upstream_model = resolved.upstream_model,
        resolution = ?resolved.resolution,
        messages = request.messages.len(),
        stream = stream_mode,
        "chat completion request"
    );

    let session_id = create_session(&state.transport, &state.upstream, &normalized.title_seed).await?;
    let upstream_body = invoke_chat(
        &state.transport,
        &state.upstream,
        resolved.upstream_model,
        &normalized.prompt,
        &session_id,
    )
    .await?;

    let request_id: Arc<str> = Arc::from(request_id);
    let model: Arc<str> = Arc::from(alias);
    let created = unix_now_secs();
    let translator = StreamTranslator::new(Arc::clone(&request_id), Arc::clone(&model), created);
    let items = translate_stream(upstream_body, translator);

    let mut response = if stream_mode {
        sse_ok_response(emit_sse(items))
    } else {
        let completion = aggregate_completion(items, &request_id, &model, created).await;
        let body = serde_json::to_vec(&completion)
            .map_err(|err| GatewayError::Internal(format!("Failed to encode completion: {err}")))?;
        ok_json_response(bytes::Bytes::from(body))
    };

    if let Ok(value) = http::HeaderValue::from_str(&session_id) {
        response.headers_mut().insert(SESSION_ID_HEADER, value);
    }
    Ok(response)
}
