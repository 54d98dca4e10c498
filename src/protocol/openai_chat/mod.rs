pub mod encoder;

use serde::{Deserialize, Serialize};

pub const CHUNK_OBJECT: &str = "chat.completion.chunk";
pub const COMPLETION_OBJECT: &str = "chat.completion";

/// `OpenAI` Chat Completion request wire type.
///
/// Only the fields the gateway acts on are typed; everything else lands in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiChatRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub messages: Vec<OpenAiMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// `OpenAI` message wire type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiMessage {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<serde_json::Value>,
}

/// Roles that survive prompt flattening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    /// Parse a wire role. Anything outside the three recognized roles yields `None`.
    #[must_use]
    pub fn from_wire(role: &str) -> Option<Self> {
        match role {
            "system" => Some(ChatRole::System),
            "user" => Some(ChatRole::User),
            "assistant" => Some(ChatRole::Assistant),
            _ => None,
        }
    }
}

impl OpenAiMessage {
    #[must_use]
    pub fn role(&self) -> Option<ChatRole> {
        ChatRole::from_wire(&self.role)
    }

    /// Plain text of the message.
    ///
    /// String content is returned as-is; an array of content parts contributes its
    /// `text` parts joined with `\n`; `null` or a missing field is empty.
    #[must_use]
    pub fn text_content(&self) -> String {
        match &self.content {
            Some(serde_json::Value::String(text)) => text.clone(),
            Some(serde_json::Value::Array(parts)) => {
                let mut out = String::new();
                for part in parts {
                    let text = part
                        .get("text")
                        .and_then(serde_json::Value::as_str)
                        .filter(|_| {
                            part.get("type")
                                .and_then(serde_json::Value::as_str)
                                .map_or(true, |kind| kind == "text")
                        });
                    if let Some(text) = text {
                        if !out.is_empty() {
                            out.push('\n');
                        }
                        out.push_str(text);
                    }
                }
                out
            }
            Some(serde_json::Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }
}

/// A streaming chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiStreamChunk {
    pub id: String,
    pub object: String,
    pub created: u64,
    pub model: String,
    pub choices: Vec<OpenAiStreamChoice>,
}

/// A choice within a stream chunk. `finish_reason` is always serialized, `null` while open.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiStreamChoice {
    pub index: u32,
    pub delta: OpenAiDelta,
    pub finish_reason: Option<String>,
}

/// Delta content within a stream choice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenAiDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_content: Option<String>,
}

/// `OpenAI` Chat Completion response wire type, used when the client did not ask to stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiChatResponse {
    pub id: String,
    pub object: String,
    pub created: u64,
    pub model: String,
    pub choices: Vec<OpenAiChoice>,
}

/// A single choice in the response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiChoice {
    pub index: u32,
    pub message: OpenAiResponseMessage,
    pub finish_reason: Option<String>,
}

/// Assistant message in a non-streaming response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiResponseMessage {
    pub role: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_content: Option<String>,
}

/// `GET /v1/models` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiModelList {
    pub object: String,
    pub data: Vec<OpenAiModel>,
}

/// One entry of the model list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiModel {
    pub id: String,
    pub object: String,
    pub created: u64,
    pub owned_by: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(value: serde_json::Value) -> OpenAiMessage {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!(ChatRole::from_wire("system"), Some(ChatRole::System));
        assert_eq!(ChatRole::from_wire("assistant"), Some(ChatRole::Assistant));
        assert_eq!(ChatRole::from_wire("tool"), None);
        assert_eq!(ChatRole::from_wire("developer"), None);
    }

    #[test]
    fn test_text_content_string_and_null() {
        assert_eq!(
            message(json!({"role":"user","content":"hi"})).text_content(),
            "hi"
        );
        assert_eq!(
            message(json!({"role":"assistant","content":null})).text_content(),
            ""
        );
        assert_eq!(message(json!({"role":"assistant"})).text_content(), "");
    }

    #[test]
    fn test_text_content_parts_skip_images() {
        let msg = message(json!({
            "role": "user",
            "content": [
                {"type": "text", "text": "look"},
                {"type": "image_url", "image_url": {"url": "https://x/y.png"}},
                {"type": "text", "text": "here"}
            ]
        }));
        assert_eq!(msg.text_content(), "look\nhere");
    }

    #[test]
    fn test_request_model_is_optional() {
        let req: OpenAiChatRequest = serde_json::from_value(json!({
            "messages": [{"role": "user", "content": "x"}],
            "temperature": 0.2
        }))
        .unwrap();
        assert!(req.model.is_none());
        assert!(req.stream.is_none());
        assert!(req.extra.contains_key("temperature"));
    }

    #[test]
    fn test_stream_chunk_keeps_null_finish_reason() {
        let chunk = OpenAiStreamChunk {
            id: "req-1".into(),
            object: CHUNK_OBJECT.into(),
            created: 1,
            model: "gpt-4o-mini".into(),
            choices: vec![OpenAiStreamChoice {
                index: 0,
                delta: OpenAiDelta {
                    content: Some("hi".into()),
                    reasoning_content: None,
                },
                finish_reason: None,
            }],
        };
        let value = serde_json::to_value(&chunk).unwrap();
        assert!(value["choices"][0]["finish_reason"].is_null());
        assert_eq!(value["choices"][0]["delta"], json!({"content": "hi"}));
    }
}
