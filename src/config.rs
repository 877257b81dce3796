// src/config.rs
use std::env;

const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 100;
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_PORT: u16 = 3000;

/// Process-wide read-only configuration, read once at startup and passed
/// explicitly to whoever needs it.
#[derive(Clone, Debug)]
pub struct Config {
    /// Gemini API key. Absence is a degraded mode (the endpoint answers with
    /// a configuration fallback), not a startup failure.
    pub api_key: Option<String>,
    pub model: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
    /// Off by default. When enabled, replies are stripped to ASCII
    /// word/punctuation characters and capped at 30 words.
    pub reply_filter: bool,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            reply_filter: false,
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let api_key = env::var("GEMINI_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        Self {
            api_key,
            model: env::var("NEXA_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            max_output_tokens: parse_env("NEXA_MAX_OUTPUT_TOKENS", DEFAULT_MAX_OUTPUT_TOKENS),
            temperature: parse_env("NEXA_TEMPERATURE", DEFAULT_TEMPERATURE),
            reply_filter: matches!(
                env::var("NEXA_REPLY_FILTER").as_deref(),
                Ok("1") | Ok("true")
            ),
            port: parse_env("PORT", DEFAULT_PORT),
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
