use axum::response::Response;
use futures_util::{Stream, StreamExt};

use crate::protocol::openai_chat::encoder::encode_completion;
use crate::protocol::openai_chat::OpenAiChatResponse;
use crate::stream::{ChunkDelta, StreamItem};

#[inline]
pub(crate) fn ok_json_response(body_bytes: bytes::Bytes) -> Response {
    let mut response = Response::new(axum::body::Body::from(body_bytes));
    *response.status_mut() = http::StatusCode::OK;
    response.headers_mut().insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("application/json"),
    );
    response
}

/// Fold a translated stream into one `chat.completion` object.
///
/// Error chunks are kept in the content exactly as a streaming client would see them.
pub(crate) async fn aggregate_completion<S>(
    items: S,
    id: &str,
    model: &str,
    created: u64,
) -> OpenAiChatResponse
where
    S: Stream<Item = StreamItem>,
{
    let mut content = String::new();
    let mut reasoning = String::new();

    let mut items = std::pin::pin!(items);
    while let Some(item) = items.next().await {
        let StreamItem::Chunk(chunk) = item else {
            break;
        };
        match chunk.delta {
            ChunkDelta::Content(text) => content.push_str(&text),
            ChunkDelta::Reasoning(text) => reasoning.push_str(&text),
        }
    }

    let reasoning = (!reasoning.is_empty()).then_some(reasoning);
    encode_completion(id, model, created, content, reasoning)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{CompletionChunk, FinishReason};
    use std::sync::Arc;

    fn chunk(delta: ChunkDelta, finish_reason: Option<FinishReason>) -> StreamItem {
        StreamItem::Chunk(CompletionChunk {
            id: Arc::from("req-1"),
            model: Arc::from("m"),
            created: 9,
            delta,
            finish_reason,
        })
    }

    #[tokio::test]
    async fn test_aggregate_splits_content_and_reasoning() {
        let items = futures_util::stream::iter(vec![
            chunk(ChunkDelta::Reasoning("think ".into()), None),
            chunk(ChunkDelta::Reasoning("more".into()), None),
            chunk(ChunkDelta::Content("Hel".into()), None),
            chunk(ChunkDelta::Content("lo".into()), None),
            StreamItem::Done,
        ]);
        let response = aggregate_completion(items, "req-1", "m", 9).await;
        let message = &response.choices[0].message;
        assert_eq!(message.content, "Hello");
        assert_eq!(message.reasoning_content.as_deref(), Some("think more"));
        assert_eq!(response.choices[0].finish_reason.as_deref(), Some("stop"));
    }

    #[tokio::test]
    async fn test_aggregate_omits_empty_reasoning_and_keeps_errors() {
        let items = futures_util::stream::iter(vec![
            chunk(ChunkDelta::Content("partial".into()), None),
            chunk(
                ChunkDelta::Content("\n[Stream Error: reset]".into()),
                Some(FinishReason::Stop),
            ),
            StreamItem::Done,
        ]);
        let response = aggregate_completion(items, "req-1", "m", 9).await;
        let message = &response.choices[0].message;
        assert_eq!(message.content, "partial\n[Stream Error: reset]");
        assert!(message.reasoning_content.is_none());
    }
}
