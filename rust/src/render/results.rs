//! Newest-first list of answered queries.

use std::collections::HashMap;

use colored::Colorize;

use super::answer;
use super::chunk::ChunkView;
use crate::model::{HistoryEntry, ResultHistory};

/// Per-chunk view state for every rendered result. Flags are keyed by the
/// history sequence number, so prepending a result never moves another
/// entry's flags.
#[derive(Debug, Default)]
pub struct ResultList {
    views: HashMap<u64, Vec<ChunkView>>,
}

impl ResultList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds view state for new entries and forgets entries no longer present.
    pub fn sync(&mut self, history: &ResultHistory) {
        self.views
            .retain(|seq, _| history.iter().any(|entry| entry.seq == *seq));
        for entry in history.iter() {
            self.views
                .entry(entry.seq)
                .or_insert_with(|| vec![ChunkView::default(); entry.result.retrieved_chunks.len()]);
        }
    }

    /// Toggles chunk `chunk` of the result at display position `result`
    /// (both zero-based). Returns the new flag, or `None` if out of range.
    pub fn toggle(&mut self, history: &ResultHistory, result: usize, chunk: usize) -> Option<bool> {
        self.sync(history);
        let seq = history.get(result)?.seq;
        let view = self.views.get_mut(&seq)?.get_mut(chunk)?;
        view.toggle();
        Some(view.is_expanded())
    }

    pub fn is_expanded(&self, seq: u64, chunk: usize) -> bool {
        self.views
            .get(&seq)
            .and_then(|views| views.get(chunk))
            .is_some_and(ChunkView::is_expanded)
    }

    pub fn render(&self, history: &ResultHistory, clamp_lines: usize) -> String {
        history
            .iter()
            .enumerate()
            .map(|(position, entry)| self.render_entry(position, entry, clamp_lines))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn render_entry(&self, position: usize, entry: &HistoryEntry, clamp_lines: usize) -> String {
        let result = &entry.result;
        let mut out = format!(
            "{} {}\n",
            format!("[{}]", position + 1).bright_black(),
            format!("> {}", result.question).bold()
        );
        out.push_str(&answer::render(&result.answer));
        out.push('\n');
        out.push_str(
            &format!(
                "sources ({})  {}",
                result.chunk_count,
                result.received_at.format("%H:%M:%S")
            )
            .bright_black()
            .to_string(),
        );

        let default_view = ChunkView::default();
        let views = self.views.get(&entry.seq);
        for (i, chunk) in result.retrieved_chunks.iter().enumerate() {
            let view = views.and_then(|v| v.get(i)).unwrap_or(&default_view);
            out.push_str(&format!("\n  [{}.{}] ", position + 1, i + 1));
            out.push_str(&view.render(chunk, clamp_lines).replace('\n', "\n    "));
        }
        out
    }
}
