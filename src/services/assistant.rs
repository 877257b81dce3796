// src/services/assistant.rs
//
// Orchestration between the chat endpoint and the model: credential gate,
// prompt assembly, history replay, reply normalization, and degradation to
// fallback text. This function never fails; the caller always gets a
// renderable string.

use tracing::{error, warn};

use crate::config::Config;
use crate::message::Message;
use crate::services::fallback;
use crate::services::gemini::{ChatModel, ModelError};
use crate::services::history;

pub const SYSTEM_PROMPT: &str = "You are Nexa, a friendly AI assistant for students. \
Reply in the same language the user writes in, and never mix languages within one response. \
Match the length of your explanation to the complexity of the question: a short answer for a \
simple question, more detail only when it is genuinely needed. You have no access to live or \
real-time data such as news, weather, scores or prices; if asked for it, say so politely and \
decline. Stay concise, friendly and appropriate for a student audience.";

pub async fn generate_reply(
    model: Option<&dyn ChatModel>,
    config: &Config,
    message: &str,
    chat_history: &[Message],
) -> String {
    if config.api_key.is_none() {
        warn!("GEMINI_API_KEY is not configured, skipping model call");
        return fallback::CONFIG_ERROR_REPLY.to_string();
    }
    let Some(model) = model else {
        warn!("no model client available, skipping model call");
        return fallback::CONFIG_ERROR_REPLY.to_string();
    };

    let turns = history::forwarded_turns(chat_history, message);

    match model.generate(SYSTEM_PROMPT, &turns).await {
        Ok(text) => normalize_reply(&text, config.reply_filter),
        Err(ModelError::CredentialInvalid) => {
            warn!("model rejected the configured API key");
            fallback::KEY_EXPIRED_REPLY.to_string()
        }
        Err(err @ (ModelError::RateLimited | ModelError::Unavailable(_))) => {
            warn!(error = %err, "model call failed, using keyword fallback");
            fallback::select_reply(message).to_string()
        }
        Err(err @ ModelError::Unknown(_)) => {
            error!(error = %err, "unexpected model failure");
            fallback::CONFUSED_REPLY.to_string()
        }
    }
}

/// Trim surrounding whitespace; with the filter on, additionally strip
/// characters outside ASCII word/whitespace/basic punctuation and cap the
/// reply at 30 words.
pub fn normalize_reply(raw: &str, filter: bool) -> String {
    if !filter {
        return raw.trim().to_string();
    }

    let filtered: String = raw
        .chars()
        .filter(|c| {
            c.is_ascii_alphanumeric()
                || c.is_whitespace()
                || matches!(c, '_' | '.' | ',' | '!' | '?')
        })
        .collect();

    let words: Vec<&str> = filtered.split_whitespace().collect();
    if words.len() > 30 {
        format!("{}...", words[..30].join(" "))
    } else {
        filtered.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_whitespace_unconditionally() {
        assert_eq!(normalize_reply("  Hi there!\n\n", false), "Hi there!");
        assert_eq!(normalize_reply("  Hi there!\n\n", true), "Hi there!");
    }

    #[test]
    fn filter_off_keeps_content_verbatim() {
        assert_eq!(
            normalize_reply("¡Hola! ¿Cómo estás? \u{1F60A}", false),
            "¡Hola! ¿Cómo estás? \u{1F60A}"
        );
    }

    #[test]
    fn filter_strips_non_ascii_punctuation() {
        let out = normalize_reply("Sure \u{1F60A} yes!", true);
        assert_eq!(out.split_whitespace().collect::<Vec<_>>(), ["Sure", "yes!"]);
        assert!(!out.contains('\u{1F60A}'));
    }

    #[test]
    fn filter_caps_at_thirty_words() {
        let long = (1..=40)
            .map(|n| format!("w{n}"))
            .collect::<Vec<_>>()
            .join(" ");
        let capped = normalize_reply(&long, true);
        assert!(capped.ends_with("w30..."));
        assert_eq!(capped.split_whitespace().count(), 30);
    }
}
