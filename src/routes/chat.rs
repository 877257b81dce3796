// src/routes/chat.rs
use axum::{Json, extract::State};
use tracing::info;
use uuid::Uuid;

use crate::{
    error::AppError,
    message::{ChatRequest, ChatResponse},
    services::assistant,
    state::SharedState,
};

/// `POST /api/chat`. Returns `200` for every chat outcome, including all
/// degraded fallback replies; `400` only for an unusable request (malformed
/// JSON or an empty message). The body always carries a renderable
/// `response` string.
pub async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let trimmed = payload.message.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest("Message cannot be empty".to_string()));
    }

    let request_id = Uuid::new_v4();
    info!(
        %request_id,
        history_len = payload.chat_history.len(),
        "received chat message"
    );

    let response = assistant::generate_reply(
        state.model.as_deref(),
        &state.config,
        trimmed,
        &payload.chat_history,
    )
    .await;

    info!(%request_id, reply_len = response.len(), "sending reply");
    Ok(Json(ChatResponse { response }))
}
