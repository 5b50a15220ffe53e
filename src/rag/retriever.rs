use std::sync::Arc;

use super::store::{DocSearchResult, DocumentStore};
use crate::core::errors::ApiError;
use crate::llm::LlmProvider;

/// Similarity retriever over the document index.
#[derive(Clone)]
pub struct Retriever {
    provider: Arc<dyn LlmProvider>,
    store: Arc<dyn DocumentStore>,
    embed_model: String,
    top_k: usize,
}

impl Retriever {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        store: Arc<dyn DocumentStore>,
        embed_model: String,
        top_k: usize,
    ) -> Self {
        Self {
            provider,
            store,
            embed_model,
            top_k,
        }
    }

    /// Embed the query and return the top-k most similar chunks.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<DocSearchResult>, ApiError> {
        let embeddings = self
            .provider
            .embed(&[query.to_string()], &self.embed_model)
            .await?;
        let query_embedding = embeddings
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::Internal("embedding response was empty".to_string()))?;

        self.store.search(&query_embedding, self.top_k).await
    }
}
