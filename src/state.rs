use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::core::config::{AppConfig, AppPaths};
use crate::history::SessionStore;
use crate::llm::{LlmProvider, OpenAiProvider};
use crate::rag::{DocumentStore, Retriever, SqliteDocStore};

pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub config: AppConfig,
    pub provider: Arc<dyn LlmProvider>,
    pub store: Arc<dyn DocumentStore>,
    pub retriever: Retriever,
    pub sessions: SessionStore,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Production composition root. Failures here halt startup; everything
    /// past this point surfaces errors as chat text instead.
    pub async fn initialize() -> anyhow::Result<Arc<Self>> {
        let paths = Arc::new(AppPaths::new());
        let config = AppConfig::load(&paths.config_path)?;

        let api_key = AppConfig::api_key();
        if api_key.is_none() && config.llm.base_url.contains("api.openai.com") {
            anyhow::bail!("OPENAI_API_KEY is not set and no local LLM endpoint is configured");
        }

        let provider: Arc<dyn LlmProvider> = Arc::new(OpenAiProvider::new(
            config.llm.base_url.clone(),
            api_key,
            Duration::from_secs(config.llm.request_timeout_secs),
        )?);

        let store: Arc<dyn DocumentStore> =
            Arc::new(SqliteDocStore::with_path(paths.index_db_path.clone()).await?);

        Ok(Self::with_parts(paths, config, provider, store))
    }

    /// Assemble state from pre-built parts. Tests use this to inject
    /// scripted providers and temporary stores.
    pub fn with_parts(
        paths: Arc<AppPaths>,
        config: AppConfig,
        provider: Arc<dyn LlmProvider>,
        store: Arc<dyn DocumentStore>,
    ) -> Arc<Self> {
        let retriever = Retriever::new(
            provider.clone(),
            store.clone(),
            config.llm.embed_model.clone(),
            config.retrieval.top_k,
        );

        Arc::new(AppState {
            paths,
            config,
            provider,
            store,
            retriever,
            sessions: SessionStore::new(),
            started_at: Utc::now(),
        })
    }
}
