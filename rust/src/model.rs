//! Domain entities produced at the HTTP boundary and owned by the controller.
//!
//! Nothing in here talks to the network. [`IndexInfo`], [`QueryResult`] and
//! [`Chunk`] are built from wire payloads by `api::wire`; [`ResultHistory`]
//! is the newest-first list of answered queries.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Summary of the repository the backend currently has indexed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexInfo {
    pub repository: String,
    pub file_count: u64,
    pub chunk_count: u64,
    pub languages: Vec<String>,
    pub skipped_files: Option<u64>,
    pub message: Option<String>,
}

impl IndexInfo {
    /// Repository as shown to the user, without the GitHub origin prefix.
    pub fn short_name(&self) -> &str {
        self.repository
            .strip_prefix("https://github.com/")
            .unwrap_or(&self.repository)
    }
}

/// One retrieved evidence passage, in backend rank order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chunk {
    pub filepath: String,
    pub symbol_name: Option<String>,
    pub similarity_score: f64,
    pub content: String,
    pub language: Option<String>,
    pub chunk_type: Option<String>,
    pub start_line: Option<u64>,
}

impl Chunk {
    /// `path` or `path:line` when the backend reported a start line.
    pub fn location(&self) -> String {
        match self.start_line {
            Some(line) => format!("{}:{}", self.filepath, line),
            None => self.filepath.clone(),
        }
    }
}

/// A completed query. `chunk_count` is the count the backend transmitted and
/// is kept as-is even when it disagrees with `retrieved_chunks.len()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub question: String,
    pub answer: String,
    pub retrieved_chunks: Vec<Chunk>,
    pub chunk_count: u64,
    pub repository: Option<String>,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    /// Stable identity for the lifetime of the session, never reused.
    pub seq: u64,
    pub result: QueryResult,
}

/// Answered queries, newest first.
#[derive(Debug, Default)]
pub struct ResultHistory {
    entries: VecDeque<HistoryEntry>,
    next_seq: u64,
}

impl ResultHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts `result` at index 0 and returns its sequence number.
    pub fn prepend(&mut self, result: QueryResult) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push_front(HistoryEntry { seq, result });
        seq
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }
}
