//! Startup index build.
//!
//! The corpus is fingerprinted (relative path, length, mtime of every
//! supported file, plus the embedding model id); when the stored fingerprint
//! matches and the index is non-empty, the existing index is reused.
//! Otherwise the corpus is re-chunked, embedded in batches and written to
//! the store. Changing the embedding model invalidates every stored vector,
//! which is why the model id is part of the fingerprint.

use std::path::Path;
use std::time::UNIX_EPOCH;

use sha2::{Digest, Sha256};
use uuid::Uuid;
use walkdir::WalkDir;

use super::chunker::split_text;
use super::loader::{self, load_corpus};
use super::store::{DocChunk, DocumentStore};
use crate::core::config::{AppConfig, AppPaths};
use crate::core::errors::ApiError;
use crate::llm::LlmProvider;

#[derive(Debug, Clone)]
pub struct IndexSummary {
    pub reused: bool,
    pub documents: usize,
    pub chunks: usize,
}

pub async fn ensure_index(
    config: &AppConfig,
    paths: &AppPaths,
    provider: &dyn LlmProvider,
    store: &dyn DocumentStore,
) -> Result<IndexSummary, ApiError> {
    let fingerprint = corpus_fingerprint(&paths.docs_dir, &config.llm.embed_model)?;

    let existing = store.count().await?;
    if existing > 0 && store.fingerprint().await?.as_deref() == Some(fingerprint.as_str()) {
        return Ok(IndexSummary {
            reused: true,
            documents: 0,
            chunks: existing,
        });
    }

    let documents = load_corpus(&paths.docs_dir)?;
    let document_count = documents.len();

    let mut chunks: Vec<DocChunk> = Vec::new();
    for document in &documents {
        for page in &document.pages {
            for (chunk_index, content) in split_text(
                &page.text,
                config.retrieval.chunk_size,
                config.retrieval.chunk_overlap,
            )
            .into_iter()
            .enumerate()
            {
                chunks.push(DocChunk {
                    chunk_id: Uuid::new_v4().to_string(),
                    content,
                    source: document.source.clone(),
                    page: page.page,
                    chunk_index,
                });
            }
        }
    }

    store.clear().await?;

    let total = chunks.len();
    for batch in chunks.chunks(config.retrieval.embed_batch_size) {
        let inputs: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
        let embeddings = provider.embed(&inputs, &config.llm.embed_model).await?;
        if embeddings.len() != batch.len() {
            return Err(ApiError::Internal(format!(
                "embedding batch size mismatch: sent {}, received {}",
                batch.len(),
                embeddings.len()
            )));
        }

        let items: Vec<(DocChunk, Vec<f32>)> =
            batch.iter().cloned().zip(embeddings.into_iter()).collect();
        store.insert_batch(items).await?;
    }

    store.set_fingerprint(&fingerprint).await?;

    Ok(IndexSummary {
        reused: false,
        documents: document_count,
        chunks: total,
    })
}

/// Hash of every supported file's relative path, size and mtime, plus the
/// embedding model id.
fn corpus_fingerprint(docs_dir: &Path, embed_model: &str) -> Result<String, ApiError> {
    let mut entries: Vec<(String, u64, u64)> = Vec::new();

    if docs_dir.is_dir() {
        for entry in WalkDir::new(docs_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let path = entry.path();
            if !loader::is_supported(path) {
                continue;
            }

            let metadata = entry.metadata().map_err(ApiError::internal)?;
            let mtime = metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_secs())
                .unwrap_or(0);

            let relative = path
                .strip_prefix(docs_dir)
                .unwrap_or(path)
                .to_string_lossy()
                .replace('\\', "/");
            entries.push((relative, metadata.len(), mtime));
        }
    }

    entries.sort();

    let mut hasher = Sha256::new();
    hasher.update(embed_model.as_bytes());
    for (path, len, mtime) in &entries {
        hasher.update(path.as_bytes());
        hasher.update(len.to_le_bytes());
        hasher.update(mtime.to_le_bytes());
    }

    let digest = hasher.finalize();
    Ok(digest.iter().map(|b| format!("{:02x}", b)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_changes_with_corpus_and_model() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "hello").unwrap();

        let base = corpus_fingerprint(dir.path(), "embed-v1").unwrap();
        assert_eq!(base, corpus_fingerprint(dir.path(), "embed-v1").unwrap());

        let other_model = corpus_fingerprint(dir.path(), "embed-v2").unwrap();
        assert_ne!(base, other_model);

        std::fs::write(dir.path().join("b.txt"), "more").unwrap();
        let grown = corpus_fingerprint(dir.path(), "embed-v1").unwrap();
        assert_ne!(base, grown);
    }

    #[test]
    fn fingerprint_ignores_unsupported_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "hello").unwrap();
        let base = corpus_fingerprint(dir.path(), "embed-v1").unwrap();

        std::fs::write(dir.path().join("junk.bin"), [1u8, 2, 3]).unwrap();
        assert_eq!(base, corpus_fingerprint(dir.path(), "embed-v1").unwrap());
    }
}
