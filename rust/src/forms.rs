//! Draft inputs for the two submit forms.
//!
//! A form holds raw, untrimmed text and answers one question: may it submit
//! right now? Submitting itself goes through [`crate::controller::AppController`],
//! which owns both drafts.

use crate::config::{DEFAULT_TOP_K, TOP_K_HINT};
use crate::controller::WorkflowState;

#[derive(Debug, Default, Clone)]
pub struct IndexSubmission {
    input: String,
}

impl IndexSubmission {
    pub fn set_input(&mut self, raw: impl Into<String>) {
        self.input = raw.into();
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn trimmed(&self) -> &str {
        self.input.trim()
    }

    /// Disabled while indexing or querying, or while the input is blank.
    pub fn can_submit(&self, state: WorkflowState) -> bool {
        !self.trimmed().is_empty() && state.accepts_index()
    }

    /// Status line shown under the form.
    pub fn status(state: WorkflowState) -> Option<&'static str> {
        match state {
            WorkflowState::Indexing => Some("Cloning and embedding..."),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct QuerySubmission {
    question: String,
    top_k: i64,
}

impl Default for QuerySubmission {
    fn default() -> Self {
        Self::with_top_k(DEFAULT_TOP_K)
    }
}

impl QuerySubmission {
    pub fn with_top_k(top_k: i64) -> Self {
        Self {
            question: String::new(),
            top_k,
        }
    }

    pub fn set_question(&mut self, raw: impl Into<String>) {
        self.question = raw.into();
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn trimmed(&self) -> &str {
        self.question.trim()
    }

    pub fn clear_question(&mut self) {
        self.question.clear();
    }

    /// Stored verbatim. Values outside [`TOP_K_HINT`] are forwarded as-is.
    pub fn set_top_k(&mut self, top_k: i64) {
        if !TOP_K_HINT.contains(&top_k) {
            tracing::warn!(top_k, "evidence count outside 1..=20, sending unchanged");
        }
        self.top_k = top_k;
    }

    pub fn top_k(&self) -> i64 {
        self.top_k
    }

    /// Disabled until an index exists, while a query is in flight, or while
    /// the question is blank.
    pub fn can_submit(&self, state: WorkflowState) -> bool {
        !self.trimmed().is_empty() && state.accepts_query()
    }

    /// Whether the question input itself accepts typing.
    pub fn input_enabled(state: WorkflowState) -> bool {
        state.accepts_query()
    }

    pub fn placeholder(state: WorkflowState) -> &'static str {
        match state {
            WorkflowState::Indexed | WorkflowState::Querying => "Ask anything about the codebase...",
            WorkflowState::Idle | WorkflowState::Indexing => "Index a repo first",
        }
    }
}
