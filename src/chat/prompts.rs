//! Prompt templates and fixed user-facing texts.
//!
//! Diagnostic texts always go through `build_error_message` so every failure
//! bubble ends with the administrator-contact line.

/// Rewrites the latest question into a standalone search query.
pub const CONDENSE_QUESTION_PROMPT: &str = "\
Given the conversation so far and the latest user question, rewrite the \
question as a single standalone question that can be understood without the \
conversation. Do not answer it. Return only the rewritten question, or the \
question unchanged if it is already self-contained.";

/// Answer prompt for document-search mode. `{context}` is replaced with the
/// stuffed reference documents and `{no_match}` with `NO_MATCH_ANSWER`.
const DOC_SEARCH_PROMPT_TEMPLATE: &str = "\
You are an assistant for searching internal company documents. Answer the \
user's question using only the reference documents below. Be concise and \
quote or summarize the relevant passages. If the documents do not contain \
the information needed to answer, reply with exactly this sentence and \
nothing else:
{no_match}

Reference documents:
{context}";

/// Answer prompt for internal-inquiry mode.
pub const INQUIRY_PROMPT: &str = "\
You are an internal helpdesk assistant for company employees. Answer \
questions about internal rules, procedures and day-to-day work politely and \
concisely, taking the conversation so far into account. If you do not know \
the answer, say so honestly instead of guessing.";

/// Fixed sentence for document-search questions the corpus cannot answer.
pub const NO_MATCH_ANSWER: &str =
    "No information matching your question was found in the internal documents. \
Please try rephrasing your question.";

/// Advisory line shown above the citation list.
pub const SOURCES_ADVISORY: &str =
    "The documents below were used as references for this answer.";

/// Placeholder when the model returns an empty completion.
pub const EMPTY_ANSWER_PLACEHOLDER: &str = "(No answer text was returned.)";

pub const ANSWER_GENERATION_ERROR: &str = "Failed to generate an answer.";

pub const COMMON_ERROR_GUIDANCE: &str =
    "Please try again in a moment. If the problem persists, contact the system \
administrator.";

/// Every diagnostic shown as chat text carries the common guidance trailer.
pub fn build_error_message(message: &str) -> String {
    format!("{}\n{}", message, COMMON_ERROR_GUIDANCE)
}

pub fn doc_search_prompt(context: &str) -> String {
    DOC_SEARCH_PROMPT_TEMPLATE
        .replace("{no_match}", NO_MATCH_ANSWER)
        .replace("{context}", context)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_carries_common_guidance() {
        let message = build_error_message(ANSWER_GENERATION_ERROR);
        assert!(message.starts_with(ANSWER_GENERATION_ERROR));
        assert!(message.ends_with(COMMON_ERROR_GUIDANCE));
        assert!(!message.is_empty());
    }

    #[test]
    fn doc_search_prompt_fills_placeholders() {
        let prompt = doc_search_prompt("[1] handbook.txt\nSome text");
        assert!(prompt.contains(NO_MATCH_ANSWER));
        assert!(prompt.contains("[1] handbook.txt"));
        assert!(!prompt.contains("{context}"));
        assert!(!prompt.contains("{no_match}"));
    }
}
