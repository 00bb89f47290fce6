use axum::{routing::post, Router};

use crate::controllers::chat_controller::post_chat;
use crate::state::AppState;

/// Configura las rutas del asistente de chat
pub fn chat_routes() -> Router<AppState> {
    Router::new().route("/api/chat", post(post_chat))
}
