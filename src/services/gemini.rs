// src/services/gemini.rs
//
// Thin client for the Gemini `generateContent` REST API. Provider failures
// are classified into `ModelError` kinds exactly once, here at the boundary;
// callers match on kinds, never on error text.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Speaker role as the chat completion API expects it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// One conversation turn forwarded to the model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model credential invalid or expired")]
    CredentialInvalid,
    #[error("model rate limited")]
    RateLimited,
    /// Provider unreachable or it rejected the request for any reason other
    /// than credentials or quota.
    #[error("model unavailable: {0}")]
    Unavailable(String),
    /// The provider answered but the response could not be used (parse
    /// failure, empty candidate list).
    #[error("unexpected model error: {0}")]
    Unknown(String),
}

/// Submit a system instruction plus alternating turns, get reply text back.
/// The only surface the rest of the backend knows about; tests substitute a
/// stub implementation.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn generate(&self, system: &str, turns: &[Turn]) -> Result<String, ModelError>;
}

pub struct GeminiClient {
    http: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_output_tokens: u32,
    temperature: f32,
}

impl GeminiClient {
    pub fn new(api_key: String, config: &Config) -> Self {
        Self {
            http: Client::new(),
            api_key,
            base_url: GEMINI_API_BASE.to_string(),
            model: config.model.clone(),
            max_output_tokens: config.max_output_tokens,
            temperature: config.temperature,
        }
    }

    /// Point the client at a different host (local mock servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[async_trait]
impl ChatModel for GeminiClient {
    async fn generate(&self, system: &str, turns: &[Turn]) -> Result<String, ModelError> {
        let body = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: system.to_string(),
                }],
            },
            contents: turns
                .iter()
                .map(|t| Content {
                    role: Some(t.role.as_str()),
                    parts: vec![Part {
                        text: t.text.clone(),
                    }],
                })
                .collect(),
            generation_config: GenerationConfig {
                max_output_tokens: self.max_output_tokens,
                temperature: self.temperature,
            },
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        // Single call, no retry: a failure is classified, not retried.
        let resp = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelError::Unavailable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_else(|_| "<no body>".to_string());
            return Err(classify(status, &body));
        }

        let parsed: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| ModelError::Unknown(format!("response parse error: {e}")))?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(ModelError::Unknown("empty candidate list".to_string()));
        }
        Ok(text)
    }
}

/// Map a non-success provider response to an error kind. Credential wording
/// is checked first since the provider reports expired keys as a 400. Every
/// other rejection, a malformed request included, degrades the same way as
/// an unreachable provider; `Unknown` is reserved for responses this client
/// could not make sense of.
fn classify(status: StatusCode, body: &str) -> ModelError {
    if body.contains("API key expired") || body.contains("API_KEY_INVALID") {
        ModelError::CredentialInvalid
    } else if status == StatusCode::TOO_MANY_REQUESTS || body.contains("RESOURCE_EXHAUSTED") {
        ModelError::RateLimited
    } else {
        ModelError::Unavailable(format!("{status}: {body}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expired_key_is_credential_invalid() {
        let err = classify(
            StatusCode::BAD_REQUEST,
            r#"{"error":{"code":400,"message":"API key expired. Please renew the API key.","status":"INVALID_ARGUMENT"}}"#,
        );
        assert!(matches!(err, ModelError::CredentialInvalid));
    }

    #[test]
    fn invalid_key_is_credential_invalid() {
        let err = classify(
            StatusCode::BAD_REQUEST,
            r#"{"error":{"message":"API key not valid.","details":[{"reason":"API_KEY_INVALID"}]}}"#,
        );
        assert!(matches!(err, ModelError::CredentialInvalid));
    }

    #[test]
    fn quota_exhaustion_is_rate_limited() {
        let err = classify(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"error":{"status":"RESOURCE_EXHAUSTED"}}"#,
        );
        assert!(matches!(err, ModelError::RateLimited));

        // Some quota errors come back as 403 with the status in the body.
        let err = classify(
            StatusCode::FORBIDDEN,
            r#"{"error":{"status":"RESOURCE_EXHAUSTED"}}"#,
        );
        assert!(matches!(err, ModelError::RateLimited));
    }

    #[test]
    fn server_errors_are_unavailable() {
        let err = classify(StatusCode::SERVICE_UNAVAILABLE, "upstream overloaded");
        assert!(matches!(err, ModelError::Unavailable(_)));
    }

    #[test]
    fn malformed_request_rejection_is_unavailable() {
        // A provider 400 without credential wording degrades like any other
        // provider failure, never like an unusable response.
        let err = classify(StatusCode::BAD_REQUEST, "malformed contents");
        assert!(matches!(err, ModelError::Unavailable(_)));
    }
}
