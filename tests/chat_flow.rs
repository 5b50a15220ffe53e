//! End-to-end tests for the response-generation pipeline with a scripted
//! LLM provider and a temporary document index.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use refdesk_backend::chat::{self, prompts, Mode};
use refdesk_backend::core::config::{AppConfig, AppPaths};
use refdesk_backend::core::errors::ApiError;
use refdesk_backend::history::TurnContent;
use refdesk_backend::llm::{ChatRequest, LlmProvider};
use refdesk_backend::rag::{DocChunk, DocumentStore, SqliteDocStore};
use refdesk_backend::state::AppState;

struct MockProvider {
    /// Scripted chat answer; `None` makes every chat call fail.
    chat_answer: Option<String>,
    chat_calls: AtomicUsize,
    embed_calls: AtomicUsize,
}

impl MockProvider {
    fn answering(answer: &str) -> Arc<Self> {
        Arc::new(Self {
            chat_answer: Some(answer.to_string()),
            chat_calls: AtomicUsize::new(0),
            embed_calls: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            chat_answer: None,
            chat_calls: AtomicUsize::new(0),
            embed_calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn health_check(&self) -> Result<bool, ApiError> {
        Ok(true)
    }

    async fn chat(&self, _request: ChatRequest, _model_id: &str) -> Result<String, ApiError> {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        match &self.chat_answer {
            Some(answer) => Ok(answer.clone()),
            None => Err(ApiError::ServiceUnavailable),
        }
    }

    async fn embed(&self, inputs: &[String], _model_id: &str) -> Result<Vec<Vec<f32>>, ApiError> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        Ok(inputs.iter().map(|_| vec![1.0, 0.0]).collect())
    }
}

fn seed_chunk(source: &str, page: Option<u32>, content: &str) -> (DocChunk, Vec<f32>) {
    (
        DocChunk {
            chunk_id: format!("{}#{}", source, page.unwrap_or(0)),
            content: content.to_string(),
            source: source.to_string(),
            page,
            chunk_index: 0,
        },
        vec![1.0, 0.0],
    )
}

async fn test_state(
    provider: Arc<MockProvider>,
    seed: Vec<(DocChunk, Vec<f32>)>,
) -> (Arc<AppState>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let paths = Arc::new(AppPaths::rooted(dir.path()));

    let store = Arc::new(
        SqliteDocStore::with_path(dir.path().join("index.db"))
            .await
            .unwrap(),
    );
    if !seed.is_empty() {
        store.insert_batch(seed).await.unwrap();
    }

    let store_dyn: Arc<dyn DocumentStore> = store;
    let state = AppState::with_parts(paths, AppConfig::default(), provider, store_dyn);
    (state, dir)
}

#[tokio::test]
async fn doc_search_attaches_sources_and_advisory() {
    let provider = MockProvider::answering("Employees get 20 days of paid leave.");
    let (state, _dir) = test_state(
        provider.clone(),
        vec![seed_chunk(
            "policies/leave.txt",
            None,
            "Paid leave: 20 days per year.",
        )],
    )
    .await;

    let session_id = state.sessions.create_session().await;
    let outcome = chat::generate_response(&state, &session_id, "How many leave days?").await;

    assert_eq!(outcome.mode, Mode::DocSearch);
    assert_eq!(outcome.answer, "Employees get 20 days of paid leave.");
    assert_eq!(outcome.message.as_deref(), Some(prompts::SOURCES_ADVISORY));
    assert_eq!(outcome.sources.len(), 1);
    assert_eq!(outcome.sources[0].label, "policies/leave.txt");

    // First turn: no history, so the condense round-trip is skipped and the
    // model is called exactly once.
    assert_eq!(provider.chat_calls.load(Ordering::SeqCst), 1);
    assert_eq!(provider.embed_calls.load(Ordering::SeqCst), 1);

    let turns = state.sessions.turns(&session_id).await.unwrap();
    assert_eq!(turns.len(), 2);
    let history = state.sessions.llm_history(&session_id).await;
    assert_eq!(history.len(), 2);
}

#[tokio::test]
async fn condense_runs_once_history_exists() {
    let provider = MockProvider::answering("An answer.");
    let (state, _dir) = test_state(
        provider.clone(),
        vec![seed_chunk("policies/leave.txt", None, "Leave policy text.")],
    )
    .await;

    let session_id = state.sessions.create_session().await;
    chat::generate_response(&state, &session_id, "How many leave days?").await;
    assert_eq!(provider.chat_calls.load(Ordering::SeqCst), 1);

    chat::generate_response(&state, &session_id, "And for part-timers?").await;
    // Second turn has history: condense + answer.
    assert_eq!(provider.chat_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn inquiry_turns_never_carry_sources() {
    let provider = MockProvider::answering("The office opens at 9am.");
    let (state, _dir) = test_state(
        provider.clone(),
        vec![seed_chunk("policies/office.txt", None, "Office hours: 9-18.")],
    )
    .await;

    let session_id = state.sessions.create_session().await;
    state.sessions.set_mode(&session_id, Mode::Inquiry).await;

    let outcome = chat::generate_response(&state, &session_id, "When does the office open?").await;

    assert_eq!(outcome.mode, Mode::Inquiry);
    assert!(outcome.sources.is_empty());
    assert!(outcome.message.is_none());
    // No retrieval in inquiry mode.
    assert_eq!(provider.embed_calls.load(Ordering::SeqCst), 0);

    // The history record must not contain citation data either.
    let turns = state.sessions.turns(&session_id).await.unwrap();
    match &turns[1].content {
        TurnContent::Answer(record) => {
            assert_eq!(record.mode, Mode::Inquiry);
            assert!(record.sources.is_empty());
            assert!(record.message.is_none());
        }
        TurnContent::Text(_) => panic!("assistant turn should be structured"),
    }
}

#[tokio::test]
async fn provider_failure_becomes_diagnostic_answer() {
    let provider = MockProvider::failing();
    let (state, _dir) = test_state(
        provider.clone(),
        vec![seed_chunk("policies/leave.txt", None, "Leave policy text.")],
    )
    .await;

    let session_id = state.sessions.create_session().await;
    let outcome = chat::generate_response(&state, &session_id, "How many leave days?").await;

    assert!(!outcome.answer.is_empty());
    assert!(outcome.answer.contains(prompts::ANSWER_GENERATION_ERROR));
    assert!(outcome.answer.contains(prompts::COMMON_ERROR_GUIDANCE));
    assert!(outcome.sources.is_empty());

    // The failed turn still lands in the display history...
    let turns = state.sessions.turns(&session_id).await.unwrap();
    assert_eq!(turns.len(), 2);
    // ...but not in the LLM-facing history.
    assert!(state.sessions.llm_history(&session_id).await.is_empty());
}

#[tokio::test]
async fn empty_retrieval_short_circuits_to_no_match() {
    let provider = MockProvider::answering("should never be used");
    let (state, _dir) = test_state(provider.clone(), Vec::new()).await;

    let session_id = state.sessions.create_session().await;
    let outcome = chat::generate_response(&state, &session_id, "Anything in the docs?").await;

    assert_eq!(outcome.answer, prompts::NO_MATCH_ANSWER);
    assert!(outcome.sources.is_empty());
    assert!(outcome.message.is_none());
    // No chat call is made when nothing was retrieved.
    assert_eq!(provider.chat_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn no_match_sentinel_suppresses_sources() {
    let provider = MockProvider::answering(prompts::NO_MATCH_ANSWER);
    let (state, _dir) = test_state(
        provider.clone(),
        vec![seed_chunk("policies/leave.txt", None, "Unrelated text.")],
    )
    .await;

    let session_id = state.sessions.create_session().await;
    let outcome = chat::generate_response(&state, &session_id, "Something off-topic").await;

    assert_eq!(outcome.answer, prompts::NO_MATCH_ANSWER);
    assert!(outcome.sources.is_empty());
    assert!(outcome.message.is_none());
}

#[tokio::test]
async fn pdf_citations_carry_page_numbers() {
    let provider = MockProvider::answering("See the onboarding guide.");
    let (state, _dir) = test_state(
        provider.clone(),
        vec![seed_chunk(
            "guides/onboarding.pdf",
            Some(3),
            "Onboarding checklist.",
        )],
    )
    .await;

    let session_id = state.sessions.create_session().await;
    let outcome = chat::generate_response(&state, &session_id, "Where is the checklist?").await;

    assert_eq!(outcome.sources.len(), 1);
    assert_eq!(outcome.sources[0].label, "guides/onboarding.pdf (page 3)");
    assert_eq!(outcome.sources[0].page, Some(3));
}
