use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::state::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "app": state.config.app_name,
    }))
}

pub async fn get_status(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let chunks = state.store.count().await.unwrap_or(0);
    let sessions = state.sessions.session_count().await;

    Ok(Json(json!({
        "initialized": true,
        "app": state.config.app_name,
        "indexed_chunks": chunks,
        "active_sessions": sessions,
        "started_at": state.started_at.to_rfc3339(),
    })))
}
