/// One decoded `data:` payload of the upstream stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamMarker {
    ReasonStart,
    ReasonDone,
    AnswerStart,
    AnswerDone,
    RelatedQuestionStart,
    RelatedQuestionDone,
    /// The bare `[ERROR]` token. Not paired with whatever line follows it.
    ErrorSentinel,
    /// A JSON object with a top-level `error` key, kept as raw text.
    ErrorPayload(String),
    TextFragment(String),
}

const REASON_START: &str = "[REASON_START]";
const REASON_DONE: &str = "[REASON_DONE]";
const ANSWER_START: &str = "[ANSWER_START]";
const ANSWER_DONE: &str = "[ANSWER_DONE]";
const RELATE_Q_START: &str = "[RELATE_Q_START]";
const RELATE_Q_DONE: &str = "[RELATE_Q_DONE]";
const ERROR: &str = "[ERROR]";

impl UpstreamMarker {
    /// Decode the payload of a `data:` line. Empty payloads yield `None`.
    ///
    /// The payload is whitespace-trimmed before matching, and text fragments carry
    /// the trimmed text.
    #[must_use]
    pub fn decode(payload: &str) -> Option<Self> {
        let trimmed = payload.trim();
        if trimmed.is_empty() {
            return None;
        }

        let marker = match trimmed {
            REASON_START => Self::ReasonStart,
            REASON_DONE => Self::ReasonDone,
            ANSWER_START => Self::AnswerStart,
            ANSWER_DONE => Self::AnswerDone,
            RELATE_Q_START => Self::RelatedQuestionStart,
            RELATE_Q_DONE => Self::RelatedQuestionDone,
            ERROR => Self::ErrorSentinel,
            _ if is_error_object(trimmed) => Self::ErrorPayload(trimmed.to_string()),
            _ => Self::TextFragment(trimmed.to_string()),
        };
        Some(marker)
    }
}

fn is_error_object(text: &str) -> bool {
    if !text.starts_with('{') || memchr::memmem::find(text.as_bytes(), b"\"error\"").is_none() {
        return false;
    }
    serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .and_then(|value| value.as_object().map(|obj| obj.contains_key("error")))
        .unwrap_or(false)
}
