//! In-memory session state.
//!
//! Each session holds a display log (what the UI renders), a parallel
//! LLM-facing message list (what prompt assembly consumes) and the current
//! answer mode. State lives for the lifetime of the process; there is no
//! persistence across restarts.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::chat::Mode;
use crate::llm::ChatMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Structured assistant payload for one turn.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerRecord {
    pub mode: Mode,
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum TurnContent {
    Text(String),
    Answer(AnswerRecord),
}

#[derive(Debug, Clone, Serialize)]
pub struct TurnRecord {
    pub role: Role,
    pub content: TurnContent,
    pub created_at: DateTime<Utc>,
}

impl TurnRecord {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: TurnContent::Text(text.into()),
            created_at: Utc::now(),
        }
    }

    pub fn assistant(record: AnswerRecord) -> Self {
        Self {
            role: Role::Assistant,
            content: TurnContent::Answer(record),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug)]
struct SessionEntry {
    mode: Mode,
    turns: Vec<TurnRecord>,
    llm_history: Vec<ChatMessage>,
}

impl SessionEntry {
    fn new() -> Self {
        Self {
            mode: Mode::DocSearch,
            turns: Vec::new(),
            llm_history: Vec::new(),
        }
    }
}

/// All live sessions. Cheap to share: every method takes `&self`.
#[derive(Debug, Default)]
pub struct SessionStore {
    inner: RwLock<HashMap<String, SessionEntry>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session and return its id. New sessions start in
    /// document-search mode.
    pub async fn create_session(&self) -> String {
        let id = Uuid::new_v4().to_string();
        self.inner
            .write()
            .await
            .insert(id.clone(), SessionEntry::new());
        id
    }

    pub async fn exists(&self, session_id: &str) -> bool {
        self.inner.read().await.contains_key(session_id)
    }

    pub async fn session_count(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn mode(&self, session_id: &str) -> Option<Mode> {
        self.inner.read().await.get(session_id).map(|s| s.mode)
    }

    /// Returns false when the session does not exist.
    pub async fn set_mode(&self, session_id: &str, mode: Mode) -> bool {
        match self.inner.write().await.get_mut(session_id) {
            Some(entry) => {
                entry.mode = mode;
                true
            }
            None => false,
        }
    }

    pub async fn append_turn(&self, session_id: &str, turn: TurnRecord) {
        if let Some(entry) = self.inner.write().await.get_mut(session_id) {
            entry.turns.push(turn);
        }
    }

    pub async fn turns(&self, session_id: &str) -> Option<Vec<TurnRecord>> {
        self.inner
            .read()
            .await
            .get(session_id)
            .map(|entry| entry.turns.clone())
    }

    pub async fn message_count(&self, session_id: &str) -> usize {
        self.inner
            .read()
            .await
            .get(session_id)
            .map(|entry| entry.turns.len())
            .unwrap_or(0)
    }

    /// Snapshot of the LLM-facing history for prompt assembly.
    pub async fn llm_history(&self, session_id: &str) -> Vec<ChatMessage> {
        self.inner
            .read()
            .await
            .get(session_id)
            .map(|entry| entry.llm_history.clone())
            .unwrap_or_default()
    }

    /// Record a completed exchange in the LLM-facing history. Only real model
    /// answers belong here; diagnostic substitutes would poison later
    /// prompts.
    pub async fn extend_llm_history(&self, session_id: &str, user: &str, assistant: &str) {
        if let Some(entry) = self.inner.write().await.get_mut(session_id) {
            entry.llm_history.push(ChatMessage::user(user));
            entry.llm_history.push(ChatMessage::assistant(assistant));
        }
    }
}
