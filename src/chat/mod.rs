//! Mode-dependent response generation.
//!
//! One strictly linear pass per user turn: snapshot history, run the
//! mode's pipeline, append the result to the session log. Failures at any
//! external call boundary are converted into a diagnostic answer bubble;
//! this function never surfaces an error to the caller.

pub mod prompts;

use serde::{Deserialize, Serialize};

use crate::core::errors::ApiError;
use crate::history::{AnswerRecord, TurnRecord};
use crate::llm::{ChatMessage, ChatRequest};
use crate::rag::DocSearchResult;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Retrieval-augmented answers grounded in the document index.
    DocSearch,
    /// Direct question answering without retrieval.
    Inquiry,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::DocSearch => "doc-search",
            Mode::Inquiry => "inquiry",
        }
    }

    pub fn parse(value: &str) -> Option<Mode> {
        match value {
            "doc-search" => Some(Mode::DocSearch),
            "inquiry" => Some(Mode::Inquiry),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    File,
    Web,
}

/// A citation shown next to an answer.
#[derive(Debug, Clone, Serialize)]
pub struct SourceRef {
    /// Display label, e.g. `guides/onboarding.pdf (page 3)`.
    pub label: String,
    pub kind: SourceKind,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

/// Return shape of the response-generation step: answer text plus optional
/// advisory line and citations. Consumed by the HTTP layer and by the
/// history-logging step.
#[derive(Debug, Clone, Serialize)]
pub struct ChatOutcome {
    pub mode: Mode,
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub sources: Vec<SourceRef>,
}

/// Generate the assistant reply for one user turn and record both sides in
/// the session log.
pub async fn generate_response(state: &AppState, session_id: &str, input: &str) -> ChatOutcome {
    let mode = state
        .sessions
        .mode(session_id)
        .await
        .unwrap_or(Mode::DocSearch);
    let llm_history = state.sessions.llm_history(session_id).await;

    state
        .sessions
        .append_turn(session_id, TurnRecord::user(input))
        .await;

    let result = match mode {
        Mode::DocSearch => doc_search_answer(state, &llm_history, input).await,
        Mode::Inquiry => inquiry_answer(state, &llm_history, input).await,
    };

    let outcome = match result {
        Ok(outcome) => {
            state
                .sessions
                .extend_llm_history(session_id, input, &outcome.answer)
                .await;
            outcome
        }
        Err(err) => {
            tracing::error!(mode = mode.as_str(), "Answer generation failed: {}", err);
            ChatOutcome {
                mode,
                answer: prompts::build_error_message(prompts::ANSWER_GENERATION_ERROR),
                message: None,
                sources: Vec::new(),
            }
        }
    };

    state
        .sessions
        .append_turn(
            session_id,
            TurnRecord::assistant(AnswerRecord {
                mode: outcome.mode,
                answer: outcome.answer.clone(),
                message: outcome.message.clone(),
                sources: outcome.sources.iter().map(|s| s.label.clone()).collect(),
            }),
        )
        .await;

    outcome
}

async fn doc_search_answer(
    state: &AppState,
    history: &[ChatMessage],
    input: &str,
) -> Result<ChatOutcome, ApiError> {
    let query = condense_question(state, history, input).await?;
    let results = state.retriever.retrieve(&query).await?;

    if results.is_empty() {
        return Ok(ChatOutcome {
            mode: Mode::DocSearch,
            answer: prompts::NO_MATCH_ANSWER.to_string(),
            message: None,
            sources: Vec::new(),
        });
    }

    let context = build_context(&results, state.config.retrieval.max_context_chars);

    let mut messages = vec![ChatMessage::system(prompts::doc_search_prompt(&context))];
    messages.extend(history.iter().cloned());
    messages.push(ChatMessage::user(input));

    let request =
        ChatRequest::new(messages).with_temperature(state.config.llm.temperature);
    let answer = state
        .provider
        .chat(request, &state.config.llm.chat_model)
        .await?;

    let answer = normalize_answer(answer);

    // The prompt instructs the model to emit the fixed no-match sentence
    // when the context does not cover the question; such an answer must not
    // carry citations.
    if answer.trim() == prompts::NO_MATCH_ANSWER {
        return Ok(ChatOutcome {
            mode: Mode::DocSearch,
            answer: prompts::NO_MATCH_ANSWER.to_string(),
            message: None,
            sources: Vec::new(),
        });
    }

    let sources = dedup_sources(&results);
    Ok(ChatOutcome {
        mode: Mode::DocSearch,
        answer,
        message: Some(prompts::SOURCES_ADVISORY.to_string()),
        sources,
    })
}

async fn inquiry_answer(
    state: &AppState,
    history: &[ChatMessage],
    input: &str,
) -> Result<ChatOutcome, ApiError> {
    let mut messages = vec![ChatMessage::system(prompts::INQUIRY_PROMPT)];
    messages.extend(history.iter().cloned());
    messages.push(ChatMessage::user(input));

    let request =
        ChatRequest::new(messages).with_temperature(state.config.llm.temperature);
    let answer = state
        .provider
        .chat(request, &state.config.llm.chat_model)
        .await?;

    Ok(ChatOutcome {
        mode: Mode::Inquiry,
        answer: normalize_answer(answer),
        message: None,
        sources: Vec::new(),
    })
}

/// Rewrite the question into a standalone search query using the
/// conversation. With no history the input already stands alone and the
/// model round-trip is skipped.
async fn condense_question(
    state: &AppState,
    history: &[ChatMessage],
    input: &str,
) -> Result<String, ApiError> {
    if history.is_empty() {
        return Ok(input.to_string());
    }

    let mut messages = vec![ChatMessage::system(prompts::CONDENSE_QUESTION_PROMPT)];
    messages.extend(history.iter().cloned());
    messages.push(ChatMessage::user(input));

    let rewritten = state
        .provider
        .chat(ChatRequest::new(messages), &state.config.llm.chat_model)
        .await?;

    let rewritten = rewritten.trim();
    if rewritten.is_empty() {
        Ok(input.to_string())
    } else {
        Ok(rewritten.to_string())
    }
}

fn normalize_answer(answer: String) -> String {
    let answer = answer.trim();
    if answer.is_empty() {
        prompts::EMPTY_ANSWER_PLACEHOLDER.to_string()
    } else {
        answer.to_string()
    }
}

/// Stuff retrieved chunks into a numbered context block, best match first,
/// respecting the character budget (the best chunk is always included).
fn build_context(results: &[DocSearchResult], max_chars: usize) -> String {
    let mut context = String::new();

    for (idx, result) in results.iter().enumerate() {
        let label = format_source_label(&result.chunk.source, result.chunk.page);
        let block = format!("[{}] {}\n{}", idx + 1, label, result.chunk.content.trim());

        if !context.is_empty() && context.len() + block.len() + 2 > max_chars {
            break;
        }

        if !context.is_empty() {
            context.push_str("\n\n");
        }
        context.push_str(&block);
    }

    context
}

/// Citations for display: one entry per (source, page), ranked order kept.
fn dedup_sources(results: &[DocSearchResult]) -> Vec<SourceRef> {
    let mut seen: Vec<(String, Option<u32>)> = Vec::new();
    let mut sources = Vec::new();

    for result in results {
        let key = (result.chunk.source.clone(), result.chunk.page);
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);

        sources.push(SourceRef {
            label: format_source_label(&result.chunk.source, result.chunk.page),
            kind: source_kind(&result.chunk.source),
            path: result.chunk.source.clone(),
            page: result.chunk.page,
        });
    }

    sources
}

/// Display label for a citation. PDF sources with a known page get a
/// ` (page N)` suffix.
pub fn format_source_label(source: &str, page: Option<u32>) -> String {
    match page {
        Some(page) if source.to_lowercase().ends_with(".pdf") => {
            format!("{} (page {})", source, page)
        }
        _ => source.to_string(),
    }
}

/// Web links and files get different icons in the display layer.
pub fn source_kind(source: &str) -> SourceKind {
    if source.starts_with("http://") || source.starts_with("https://") {
        SourceKind::Web
    } else {
        SourceKind::File
    }
}
