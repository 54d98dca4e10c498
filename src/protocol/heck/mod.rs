//! Wire types and text conventions of the Heck upstream.

pub mod marker;
pub mod prompt;

use serde::{Deserialize, Serialize};

pub use marker::UpstreamMarker;
pub use prompt::{normalize_messages, NormalizedPrompt};

/// `POST /session/create` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCreateRequest<'a> {
    pub title: &'a str,
}

/// `POST /session/create` response. Only `id` is read.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionCreateResponse {
    pub id: Option<String>,
}

/// `POST /chat` body.
///
/// Every request opens a fresh session, so the previous-turn fields are always `null`
/// and no images are attached.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeckChatPayload<'a> {
    pub model: &'a str,
    pub question: &'a str,
    pub language: &'a str,
    pub session_id: &'a str,
    pub previous_question: Option<&'a str>,
    pub previous_answer: Option<&'a str>,
    pub img_urls: &'a [String],
    pub super_smart_mode: bool,
}

impl<'a> HeckChatPayload<'a> {
    #[must_use]
    pub fn new(model: &'a str, question: &'a str, language: &'a str, session_id: &'a str) -> Self {
        Self {
            model,
            question,
            language,
            session_id,
            previous_question: None,
            previous_answer: None,
            img_urls: &[],
            super_smart_mode: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chat_payload_shape() {
        let payload = HeckChatPayload::new("openai/gpt-4o-mini", "[User]: hi", "Chinese", "s-1");
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "model": "openai/gpt-4o-mini",
                "question": "[User]: hi",
                "language": "Chinese",
                "sessionId": "s-1",
                "previousQuestion": null,
                "previousAnswer": null,
                "imgUrls": [],
                "superSmartMode": false
            })
        );
    }

    #[test]
    fn test_session_response_tolerates_extra_fields() {
        let resp: SessionCreateResponse =
            serde_json::from_str(r#"{"id":"abc","title":"t","createdAt":1}"#).unwrap();
        assert_eq!(resp.id.as_deref(), Some("abc"));

        let resp: SessionCreateResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.id.is_none());
    }
}
