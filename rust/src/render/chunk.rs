//! One retrieved passage with its own expand/collapse flag.

use colored::Colorize;

use crate::model::Chunk;

/// View state for a single chunk. Each instance is independent.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ChunkView {
    expanded: bool,
}

impl ChunkView {
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn toggle(&mut self) {
        self.expanded = !self.expanded;
    }

    pub fn render(&self, chunk: &Chunk, clamp_lines: usize) -> String {
        let mut header = chunk.location().dimmed().to_string();
        if let Some(symbol) = &chunk.symbol_name {
            header.push_str(&format!("  {}", format!("{symbol}()").cyan()));
        }
        header.push_str(&format!("  Score: {}", score_label(chunk.similarity_score)));

        let body = if self.expanded {
            chunk.content.clone()
        } else {
            clip_lines(&chunk.content, clamp_lines)
        };
        let hint = if self.expanded { "Collapse -" } else { "Expand +" };

        format!("{header}\n{}\n{}", body.dimmed(), hint.bright_black())
    }
}

/// Similarity score with exactly three decimals.
pub fn score_label(score: f64) -> String {
    format!("{score:.3}")
}

/// First `max` lines of `content`, with a marker when anything was cut.
fn clip_lines(content: &str, max: usize) -> String {
    let mut lines = content.lines();
    let kept: Vec<&str> = lines.by_ref().take(max).collect();
    let mut out = kept.join("\n");
    if lines.next().is_some() {
        out.push_str("\n...");
    }
    out
}
