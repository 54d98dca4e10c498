use crate::protocol::openai_chat::{ChatRole, OpenAiMessage};
use crate::util::char_prefix;

/// Session title used when the conversation has no usable user text.
pub const TITLE_PLACEHOLDER: &str = "Chat";

/// A conversation flattened into the upstream's single-question model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPrompt {
    pub prompt: String,
    pub title_seed: String,
}

fn role_label(role: ChatRole) -> &'static str {
    match role {
        ChatRole::System => "[System]: ",
        ChatRole::User => "[User]: ",
        ChatRole::Assistant => "[Assistant]: ",
    }
}

/// Flatten `messages` into `[Role]: content` lines, in order, and pick the session title.
///
/// Messages with unrecognized roles are dropped. The title is the first
/// `title_max_chars` characters of the last user message.
#[must_use]
pub fn normalize_messages(messages: &[OpenAiMessage], title_max_chars: usize) -> NormalizedPrompt {
    let mut prompt = String::new();
    let mut last_user: Option<String> = None;

    for message in messages {
        let Some(role) = message.role() else {
            continue;
        };
        let content = message.text_content();
        prompt.push_str(role_label(role));
        prompt.push_str(&content);
        prompt.push('\n');
        if role == ChatRole::User {
            last_user = Some(content);
        }
    }

    let prompt = prompt.trim().to_string();
    let title_seed = last_user
        .as_deref()
        .map(|text| char_prefix(text, title_max_chars))
        .filter(|seed| !seed.is_empty())
        .unwrap_or(TITLE_PLACEHOLDER)
        .to_string();

    NormalizedPrompt { prompt, title_seed }
}
