use axum::{extract::State, response::Json};
use validator::Validate;

use crate::dto::chat_dto::{ChatRequest, ChatResponse};
use crate::state::AppState;
use crate::utils::errors::AppResult;

/// Responde al visitante usando el asistente (con cache por pregunta)
pub async fn post_chat(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> AppResult<Json<ChatResponse>> {
    payload.validate()?;

    let reply = state.chat.reply(&payload.message).await?;

    Ok(Json(ChatResponse {
        reply: reply.reply,
        generated_at: reply.generated_at,
    }))
}
