use async_trait::async_trait;

use super::types::ChatRequest;
use crate::core::errors::ApiError;

/// Seam between the answer pipeline and the model endpoint.
///
/// The pipeline is synchronous request/response, so there is no streaming
/// variant. Tests substitute this trait with scripted implementations.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name (e.g. "openai").
    fn name(&self) -> &str;

    /// Check whether the endpoint is reachable.
    async fn health_check(&self) -> Result<bool, ApiError>;

    /// Chat completion. Returns the assistant message content.
    async fn chat(&self, request: ChatRequest, model_id: &str) -> Result<String, ApiError>;

    /// Embeddings, one vector per input, in input order.
    async fn embed(&self, inputs: &[String], model_id: &str) -> Result<Vec<Vec<f32>>, ApiError>;
}
