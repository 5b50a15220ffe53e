use std::env;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use refdesk_backend::core::logging;
use refdesk_backend::rag::indexer;
use refdesk_backend::server;
use refdesk_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let state = AppState::initialize().await?;
    logging::init(&state.paths);

    let summary = indexer::ensure_index(
        &state.config,
        &state.paths,
        state.provider.as_ref(),
        state.store.as_ref(),
    )
    .await
    .context("Failed to build the document index")?;

    if summary.reused {
        tracing::info!("Reusing existing document index ({} chunks)", summary.chunks);
    } else {
        tracing::info!(
            "Indexed {} documents into {} chunks",
            summary.documents,
            summary.chunks
        );
    }

    let port = env::var("PORT")
        .ok()
        .and_then(|val| val.parse::<u16>().ok())
        .unwrap_or(0);
    let bind_addr = format!("127.0.0.1:{}", port);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;

    println!("REFDESK_PORT={}", addr.port());
    tracing::info!("Listening on {}", addr);

    let app: Router = server::router::router(state.clone());

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
