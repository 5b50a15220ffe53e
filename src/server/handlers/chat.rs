use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::chat;
use crate::core::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequestBody {
    pub session_id: String,
    pub message: String,
}

/// One chat turn. A pipeline failure never maps to a non-200 here: the
/// response-generation step converts it into a diagnostic answer bubble.
pub async fn post_chat(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatRequestBody>,
) -> Result<impl IntoResponse, ApiError> {
    let message = payload.message.trim().to_string();
    if message.is_empty() {
        return Err(ApiError::BadRequest("message must not be empty".to_string()));
    }

    if !state.sessions.exists(&payload.session_id).await {
        return Err(ApiError::NotFound("session not found".to_string()));
    }

    let mode = state.sessions.mode(&payload.session_id).await;
    tracing::info!(
        session_id = %payload.session_id,
        mode = mode.map(|m| m.as_str()).unwrap_or("unknown"),
        "Chat message received"
    );

    let outcome = chat::generate_response(&state, &payload.session_id, &message).await;
    Ok(Json(outcome))
}
