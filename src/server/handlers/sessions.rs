use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::chat::Mode;
use crate::core::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SetModeRequest {
    pub mode: String,
}

pub async fn create_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let session_id = state.sessions.create_session().await;
    let mode = state
        .sessions
        .mode(&session_id)
        .await
        .unwrap_or(Mode::DocSearch);

    Json(json!({
        "session": {
            "id": session_id,
            "mode": mode,
        }
    }))
}

pub async fn get_session_messages(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let turns = state
        .sessions
        .turns(&session_id)
        .await
        .ok_or_else(|| ApiError::NotFound("session not found".to_string()))?;

    Ok(Json(json!({ "messages": turns })))
}

/// Mode selector. The mode arrives as a string so an unknown value gets the
/// explicit "unknown mode" rejection rather than a generic decode error.
pub async fn set_session_mode(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(payload): Json<SetModeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mode = Mode::parse(&payload.mode)
        .ok_or_else(|| ApiError::BadRequest(format!("unknown mode: {}", payload.mode)))?;

    if !state.sessions.set_mode(&session_id, mode).await {
        return Err(ApiError::NotFound("session not found".to_string()));
    }

    Ok(Json(json!({
        "session_id": session_id,
        "mode": mode,
    })))
}
