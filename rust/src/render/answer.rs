//! Splits free-text answers into plain and inline-code pieces.

use std::sync::LazyLock;

use colored::Colorize;
use regex::Regex;

/// A backtick, one or more non-backtick characters, a backtick.
static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`[^`]+`").expect("inline code pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    /// Code span contents, delimiters stripped.
    Code(&'a str),
}

/// Segments `answer` in original order. Plain pieces between matches are
/// kept even when empty; a piece is code only if the pattern matched it, so
/// stray or empty backtick pairs stay literal text.
pub fn segments(answer: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut last = 0;
    for m in INLINE_CODE.find_iter(answer) {
        out.push(Segment::Text(&answer[last..m.start()]));
        out.push(Segment::Code(&answer[m.start() + 1..m.end() - 1]));
        last = m.end();
    }
    out.push(Segment::Text(&answer[last..]));
    out
}

pub fn render(answer: &str) -> String {
    segments(answer)
        .into_iter()
        .map(|segment| match segment {
            Segment::Text(text) => text.to_string(),
            Segment::Code(code) => code.bright_white().on_black().to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::Segment::{Code, Text};
    use super::*;

    #[test]
    fn plain_text_is_one_segment() {
        assert_eq!(segments("plain text"), vec![Text("plain text")]);
    }

    #[test]
    fn code_span_in_the_middle() {
        assert_eq!(
            segments("call `foo()` now"),
            vec![Text("call "), Code("foo()"), Text(" now")]
        );
    }

    #[test]
    fn unmatched_backtick_stays_plain() {
        assert_eq!(
            segments("unmatched ` backtick"),
            vec![Text("unmatched ` backtick")]
        );
    }

    #[test]
    fn empty_pair_stays_plain() {
        assert_eq!(segments("``"), vec![Text("``")]);
    }

    #[test]
    fn edges_keep_empty_text_pieces() {
        assert_eq!(segments("`a`"), vec![Text(""), Code("a"), Text("")]);
        assert_eq!(
            segments("`a` and `b`"),
            vec![Text(""), Code("a"), Text(" and "), Code("b"), Text("")]
        );
    }

    #[test]
    fn lone_backtick_before_a_span_is_text() {
        assert_eq!(segments("``x`"), vec![Text("`"), Code("x"), Text("")]);
        assert_eq!(segments("`a`b`"), vec![Text(""), Code("a"), Text("b`")]);
    }

    #[test]
    fn spans_may_cross_lines_and_hold_unicode() {
        assert_eq!(
            segments("use `naïve\nfn` ok"),
            vec![Text("use "), Code("naïve\nfn"), Text(" ok")]
        );
    }

    #[test]
    fn render_without_color_drops_delimiters() {
        colored::control::set_override(false);
        assert_eq!(render("call `foo()` now"), "call foo() now");
        assert_eq!(render("``"), "``");
    }
}
