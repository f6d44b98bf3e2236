//! Terminal rendering of session state.

pub mod answer;
pub mod chunk;
pub mod results;

use colored::Colorize;
use serde::Serialize;

use crate::controller::AppController;
use crate::forms::{IndexSubmission, QuerySubmission};
use crate::model::{IndexInfo, QueryResult, ResultHistory};

pub use answer::{segments, Segment};
pub use chunk::ChunkView;
pub use results::ResultList;

pub fn index_info(info: &IndexInfo) -> String {
    let mut parts = vec![
        info.short_name().bright_white().to_string(),
        format!("{} files", info.file_count),
        format!("{} chunks", info.chunk_count),
    ];
    if !info.languages.is_empty() {
        parts.push(info.languages.join(", "));
    }
    if let Some(skipped) = info.skipped_files.filter(|n| *n > 0) {
        parts.push(format!("{skipped} skipped"));
    }
    parts.join("  ")
}

/// The error slot: one red line, or nothing.
pub fn error_line(error: Option<&str>) -> Option<String> {
    error
        .filter(|e| !e.is_empty())
        .map(|e| e.red().to_string())
}

/// Everything above the result list: index status, query prompt, error slot.
pub fn header(ctl: &AppController) -> String {
    let state = ctl.state();
    let mut lines = Vec::new();
    if let Some(status) = IndexSubmission::status(state) {
        lines.push(status.bright_black().to_string());
    }
    if let Some(info) = ctl.index_info() {
        lines.push(index_info(info));
    }
    lines.push(format!(
        "top_k={}  {}",
        ctl.query_form().top_k(),
        QuerySubmission::placeholder(state).bright_black()
    ));
    if let Some(err) = error_line(ctl.error()) {
        lines.push(err);
    }
    lines.join("\n")
}

#[derive(Serialize)]
struct SessionReport<'a> {
    index: Option<&'a IndexInfo>,
    results: Vec<&'a QueryResult>,
    error: Option<&'a str>,
}

/// Machine-readable dump of a session, results newest first.
pub fn json_report(
    index: Option<&IndexInfo>,
    history: &ResultHistory,
    error: Option<&str>,
) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&SessionReport {
        index,
        results: history.iter().map(|entry| &entry.result).collect(),
        error,
    })
}
