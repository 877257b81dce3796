// src/services/fallback.rs
//
// Canned replies used when the model cannot answer. The user never sees a
// raw error; every failure resolves to one of these strings.

/// No API key configured; returned without attempting a model call.
pub const CONFIG_ERROR_REPLY: &str = "Sorry, API key configuration problem hai. Please contact the developer to set up the Gemini API key.";

/// The provider rejected the configured key.
pub const KEY_EXPIRED_REPLY: &str =
    "API key expired ho gaya hai! Please developer ko bolke naya key set karwao. \u{1F60A}";

/// Catch-all for unexpected failures.
pub const CONFUSED_REPLY: &str = "I am a bit confused! Please try again! \u{1F60A}";

/// Default when no keyword rule matches.
pub const DEFAULT_REPLY: &str = "I am Nexa! How can I help you?";

pub struct FallbackRule {
    pub keywords: &'static [&'static str],
    pub reply: &'static str,
}

/// Evaluated in order, first match wins.
pub const RULES: &[FallbackRule] = &[
    FallbackRule {
        keywords: &["hello", "hi"],
        reply: "Hello! I am Nexa, your AI friend. How are you?",
    },
    FallbackRule {
        keywords: &["name"],
        reply: "My name is Nexa! Kartik created me.",
    },
    FallbackRule {
        keywords: &["what"],
        reply: "I help students. You can ask me anything!",
    },
    FallbackRule {
        keywords: &["how"],
        reply: "Tell me what you want to know? I will help you!",
    },
];

/// Pick a canned reply for a provider failure based on what the user asked.
pub fn select_reply(message: &str) -> &'static str {
    let lower = message.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| lower.contains(k)))
        .map(|rule| rule.reply)
        .unwrap_or(DEFAULT_REPLY)
}
