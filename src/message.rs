// src/message.rs
use serde::{Deserialize, Serialize};

/// Who authored a chat turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// One chat bubble as the UI stores it. `id` and `timestamp` are created by
/// the UI and opaque to the backend.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub id: String,
    pub content: String,
    pub sender: Sender,
    #[serde(default)]
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    /// Prior turns, oldest first. Context only; the backend keeps no state.
    #[serde(default)]
    pub chat_history: Vec<Message>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}
