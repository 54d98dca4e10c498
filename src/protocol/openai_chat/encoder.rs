use bytes::Bytes;

use super::{
    OpenAiChatResponse, OpenAiChoice, OpenAiDelta, OpenAiResponseMessage, OpenAiStreamChoice,
    OpenAiStreamChunk, CHUNK_OBJECT, COMPLETION_OBJECT,
};
use crate::stream::sse::openai_sse_frame;
use crate::stream::{ChunkDelta, CompletionChunk};

/// Map a translated chunk onto the `chat.completion.chunk` wire shape.
#[must_use]
pub fn encode_stream_chunk(chunk: &CompletionChunk) -> OpenAiStreamChunk {
    let delta = match &chunk.delta {
        ChunkDelta::Content(text) => OpenAiDelta {
            content: Some(text.clone()),
            reasoning_content: None,
        },
        ChunkDelta::Reasoning(text) => OpenAiDelta {
            content: None,
            reasoning_content: Some(text.clone()),
        },
    };
    OpenAiStreamChunk {
        id: chunk.id.to_string(),
        object: CHUNK_OBJECT.to_string(),
        created: chunk.created,
        model: chunk.model.to_string(),
        choices: vec![OpenAiStreamChoice {
            index: 0,
            delta,
            finish_reason: chunk.finish_reason.map(|reason| reason.as_str().to_string()),
        }],
    }
}

/// Serialize a chunk as one `data: {json}\n\n` frame.
pub fn encode_chunk_frame(chunk: &CompletionChunk) -> Result<Bytes, serde_json::Error> {
    let json = serde_json::to_string(&encode_stream_chunk(chunk))?;
    Ok(Bytes::from(openai_sse_frame(&json)))
}

/// Build the single `chat.completion` object returned to non-streaming clients.
#[must_use]
pub fn encode_completion(
    id: &str,
    model: &str,
    created: u64,
    content: String,
    reasoning_content: Option<String>,
) -> OpenAiChatResponse {
    OpenAiChatResponse {
        id: id.to_string(),
        object: COMPLETION_OBJECT.to_string(),
        created,
        model: model.to_string(),
        choices: vec![OpenAiChoice {
            index: 0,
            message: OpenAiResponseMessage {
                role: "assistant".to_string(),
                content,
                reasoning_content,
            },
            finish_reason: Some("stop".to_string()),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::FinishReason;
    use serde_json::json;
    use std::sync::Arc;

    fn chunk(delta: ChunkDelta, finish_reason: Option<FinishReason>) -> CompletionChunk {
        CompletionChunk {
            id: Arc::from("req-abc"),
            model: Arc::from("gpt-4o-mini"),
            created: 1_700_000_000,
            delta,
            finish_reason,
        }
    }

    #[test]
    fn test_reasoning_chunk_frame() {
        let frame = encode_chunk_frame(&chunk(ChunkDelta::Reasoning("hmm".into()), None)).unwrap();
        let text = std::str::from_utf8(&frame).unwrap();
        assert!(text.starts_with("data: "));
        assert!(text.ends_with("\n\n"));

        let value: serde_json::Value =
            serde_json::from_str(text.trim_start_matches("data: ").trim_end()).unwrap();
        assert_eq!(value["id"], "req-abc");
        assert_eq!(value["object"], "chat.completion.chunk");
        assert_eq!(value["created"], 1_700_000_000u64);
        assert_eq!(value["model"], "gpt-4o-mini");
        assert_eq!(value["choices"][0]["index"], 0);
        assert_eq!(value["choices"][0]["delta"], json!({"reasoning_content": "hmm"}));
        assert!(value["choices"][0]["finish_reason"].is_null());
    }

    #[test]
    fn test_error_chunk_carries_stop() {
        let wire = encode_stream_chunk(&chunk(
            ChunkDelta::Content("\n[Error: x]".into()),
            Some(FinishReason::Stop),
        ));
        assert_eq!(wire.choices[0].finish_reason.as_deref(), Some("stop"));
        assert_eq!(wire.choices[0].delta.content.as_deref(), Some("\n[Error: x]"));
    }

    #[test]
    fn test_completion_shape() {
        let response = encode_completion("req-1", "m", 5, "hi".into(), Some("why".into()));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["object"], "chat.completion");
        assert_eq!(value["choices"][0]["message"]["role"], "assistant");
        assert_eq!(value["choices"][0]["message"]["content"], "hi");
        assert_eq!(value["choices"][0]["message"]["reasoning_content"], "why");
        assert_eq!(value["choices"][0]["finish_reason"], "stop");
    }
}
