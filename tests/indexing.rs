//! Index build tests: fingerprint-gated rebuilds with a scripted embedder.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use refdesk_backend::core::config::{AppConfig, AppPaths};
use refdesk_backend::core::errors::ApiError;
use refdesk_backend::llm::{ChatRequest, LlmProvider};
use refdesk_backend::rag::indexer::ensure_index;
use refdesk_backend::rag::{DocumentStore, SqliteDocStore};

struct EmbedOnlyProvider {
    embed_calls: AtomicUsize,
}

#[async_trait]
impl LlmProvider for EmbedOnlyProvider {
    fn name(&self) -> &str {
        "embed-only"
    }

    async fn health_check(&self) -> Result<bool, ApiError> {
        Ok(true)
    }

    async fn chat(&self, _request: ChatRequest, _model_id: &str) -> Result<String, ApiError> {
        Err(ApiError::ServiceUnavailable)
    }

    async fn embed(&self, inputs: &[String], _model_id: &str) -> Result<Vec<Vec<f32>>, ApiError> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        Ok(inputs
            .iter()
            .map(|input| vec![input.len() as f32, 1.0])
            .collect())
    }
}

#[tokio::test]
async fn index_builds_once_and_is_reused() {
    let dir = tempfile::tempdir().unwrap();
    let paths = AppPaths::rooted(dir.path());
    std::fs::create_dir_all(&paths.docs_dir).unwrap();
    std::fs::write(
        paths.docs_dir.join("handbook.txt"),
        "Employees receive 20 days of paid leave per year.",
    )
    .unwrap();

    let config = AppConfig::default();
    let provider = EmbedOnlyProvider {
        embed_calls: AtomicUsize::new(0),
    };
    let store = SqliteDocStore::with_path(paths.index_db_path.clone())
        .await
        .unwrap();

    let summary = ensure_index(&config, &paths, &provider, &store)
        .await
        .unwrap();
    assert!(!summary.reused);
    assert_eq!(summary.documents, 1);
    assert!(summary.chunks > 0);
    assert_eq!(store.count().await.unwrap(), summary.chunks);
    assert!(provider.embed_calls.load(Ordering::SeqCst) > 0);

    // Unchanged corpus: the second boot reuses the index without embedding.
    let calls_before = provider.embed_calls.load(Ordering::SeqCst);
    let summary = ensure_index(&config, &paths, &provider, &store)
        .await
        .unwrap();
    assert!(summary.reused);
    assert_eq!(provider.embed_calls.load(Ordering::SeqCst), calls_before);
}

#[tokio::test]
async fn corpus_change_triggers_rebuild() {
    let dir = tempfile::tempdir().unwrap();
    let paths = AppPaths::rooted(dir.path());
    std::fs::create_dir_all(&paths.docs_dir).unwrap();
    std::fs::write(paths.docs_dir.join("note.txt"), "Original note.").unwrap();

    let config = AppConfig::default();
    let provider = EmbedOnlyProvider {
        embed_calls: AtomicUsize::new(0),
    };
    let store = SqliteDocStore::with_path(paths.index_db_path.clone())
        .await
        .unwrap();

    ensure_index(&config, &paths, &provider, &store)
        .await
        .unwrap();

    // A different-length file changes the fingerprint regardless of mtime
    // granularity.
    std::fs::write(
        paths.docs_dir.join("note.txt"),
        "A considerably longer revision of the note.",
    )
    .unwrap();

    let summary = ensure_index(&config, &paths, &provider, &store)
        .await
        .unwrap();
    assert!(!summary.reused);
}

#[tokio::test]
async fn missing_docs_dir_fails_the_build() {
    let dir = tempfile::tempdir().unwrap();
    let paths = AppPaths::rooted(dir.path());
    // docs dir deliberately not created

    let config = AppConfig::default();
    let provider = EmbedOnlyProvider {
        embed_calls: AtomicUsize::new(0),
    };
    let store = SqliteDocStore::with_path(paths.index_db_path.clone())
        .await
        .unwrap();

    assert!(ensure_index(&config, &paths, &provider, &store)
        .await
        .is_err());
}
