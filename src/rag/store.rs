//! DocumentStore trait — abstract interface for the document index.
//!
//! The index maps corpus chunks to embedding vectors and answers similarity
//! queries. The production implementation is `SqliteDocStore` in the
//! `sqlite` module.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::errors::ApiError;

/// An indexed chunk of a corpus document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocChunk {
    pub chunk_id: String,
    /// The text content of the chunk.
    pub content: String,
    /// Source path relative to the documents directory, or a URL.
    pub source: String,
    /// 1-based page number for paginated formats (PDF), absent otherwise.
    pub page: Option<u32>,
    /// Position of this chunk within its source page/document.
    pub chunk_index: usize,
}

/// Result of a similarity search.
#[derive(Debug, Clone)]
pub struct DocSearchResult {
    pub chunk: DocChunk,
    /// Cosine similarity to the query (higher = better).
    pub score: f32,
}

/// Abstract trait for the document index backend.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert chunks with their embedding vectors.
    async fn insert_batch(&self, items: Vec<(DocChunk, Vec<f32>)>) -> Result<(), ApiError>;

    /// Return the chunks most similar to the query embedding, best first.
    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<DocSearchResult>, ApiError>;

    /// Total number of indexed chunks.
    async fn count(&self) -> Result<usize, ApiError>;

    /// Corpus fingerprint recorded at the last successful index build.
    async fn fingerprint(&self) -> Result<Option<String>, ApiError>;

    /// Record the corpus fingerprint after a successful build.
    async fn set_fingerprint(&self, value: &str) -> Result<(), ApiError>;

    /// Drop all chunks and metadata. Used before a full rebuild.
    async fn clear(&self) -> Result<(), ApiError>;
}
