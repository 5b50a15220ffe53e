use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::server::handlers::{chat, health, sessions};
use crate::state::AppState;

/// Application router: health endpoints, session management and the chat
/// endpoint, behind permissive CORS (the service binds to loopback and is
/// fronted by the internal UI) and request tracing.
pub fn router(state: Arc<AppState>) -> Router {
    let cors_layer = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/api/status", get(health::get_status))
        .route("/api/sessions", post(sessions::create_session))
        .route(
            "/api/sessions/:session_id/messages",
            get(sessions::get_session_messages),
        )
        .route(
            "/api/sessions/:session_id/mode",
            put(sessions::set_session_mode),
        )
        .route("/api/chat", post(chat::post_chat))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}
