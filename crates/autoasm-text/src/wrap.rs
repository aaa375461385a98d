#![forbid(unsafe_code)]

//! Greedy word wrap for fixed-width character panels.
//!
//! Columns are counted in grapheme clusters: a panel cell shows one glyph,
//! and a cluster is never split across lines.
//!
//! Rules:
//! - Embedded `\n` always breaks; an empty source line yields an empty
//!   wrapped line. A trailing `\n` at the very end adds nothing.
//! - A source line longer than `width` breaks at the start of the last
//!   whitespace run within its first `width + 1` columns, so a run sitting
//!   exactly on the boundary still lets the full `width` columns through.
//!   A run starting at column 0 produces an empty line.
//! - With no usable whitespace the line hard-breaks at `width`.
//! - Whitespace after a break is consumed.
//!
//! # Example
//! ```
//! use autoasm_text::wrap::wrap_text;
//!
//! let lines = wrap_text("aaaa bbbb cccc\ndddd", 9);
//! assert_eq!(lines, vec!["aaaa bbbb", "cccc", "dddd"]);
//! ```

use unicode_segmentation::UnicodeSegmentation;

/// Wrap `text` to at most `width` columns per line.
///
/// A `width` of zero disables wrapping: the whole text comes back as one line.
#[must_use]
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let (line, next) = match rest.find('\n') {
            Some(eol) => (&rest[..eol], &rest[eol + 1..]),
            None => (rest, ""),
        };
        wrap_line(line, width, &mut lines);
        rest = next;
    }
    lines
}

/// Wrap a single source line (no embedded newlines).
fn wrap_line(line: &str, width: usize, lines: &mut Vec<String>) {
    if line.is_empty() {
        lines.push(String::new());
        return;
    }

    let graphemes: Vec<&str> = line.graphemes(true).collect();
    let mut pos = 0;
    while pos < graphemes.len() {
        let remaining = &graphemes[pos..];
        let len = if remaining.len() > width {
            break_point(remaining, width)
        } else {
            remaining.len()
        };
        lines.push(remaining[..len].concat());

        pos += len;
        while pos < graphemes.len() && is_blank(graphemes[pos]) {
            pos += 1;
        }
    }
}

/// Length of the next wrapped line taken from `graphemes` (longer than `max`).
fn break_point(graphemes: &[&str], max: usize) -> usize {
    let window = &graphemes[..=max];
    let Some(last_blank) = window.iter().rposition(|g| is_blank(g)) else {
        return max;
    };
    // A run at column 0 yields an empty line; the caller then skips the run.
    window[..last_blank]
        .iter()
        .rposition(|g| !is_blank(g))
        .map_or(0, |i| i + 1)
}

#[inline]
fn is_blank(grapheme: &str) -> bool {
    grapheme.chars().all(char::is_whitespace)
}

/// Number of panel columns `text` occupies.
#[inline]
#[must_use]
pub fn display_width(text: &str) -> usize {
    text.graphemes(true).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_line_is_untouched() {
        assert_eq!(wrap_text("hello", 10), vec!["hello"]);
    }

    #[test]
    fn exact_width_fits() {
        assert_eq!(wrap_text("hello", 5), vec!["hello"]);
    }

    #[test]
    fn break_on_boundary_whitespace() {
        let lines = wrap_text("aaaa bbbb cccc\ndddd", 9);
        assert_eq!(lines, vec!["aaaa bbbb", "cccc", "dddd"]);
    }

    #[test]
    fn break_at_last_whitespace_run() {
        let lines = wrap_text("one two three", 9);
        assert_eq!(lines, vec!["one two", "three"]);
    }

    #[test]
    fn whitespace_run_is_consumed() {
        let lines = wrap_text("alpha    beta", 7);
        assert_eq!(lines, vec!["alpha", "beta"]);
    }

    #[test]
    fn hard_break_without_whitespace() {
        let lines = wrap_text("abcdefghij", 4);
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn leading_whitespace_breaks_before_long_word() {
        let lines = wrap_text(" abcdefgh", 4);
        assert_eq!(lines, vec!["", "abcd", "efgh"]);
    }

    #[test]
    fn overlong_blank_line_wraps_to_empty() {
        assert_eq!(wrap_text("      ", 4), vec![""]);
        assert_eq!(wrap_text("      \nok", 4), vec!["", "ok"]);
    }

    #[test]
    fn empty_lines_are_kept() {
        let lines = wrap_text("a\n\nb", 10);
        assert_eq!(lines, vec!["a", "", "b"]);
    }

    #[test]
    fn trailing_newline_adds_nothing() {
        assert_eq!(wrap_text("a\n", 10), vec!["a"]);
        assert_eq!(wrap_text("a\n\n", 10), vec!["a", ""]);
    }

    #[test]
    fn empty_text_has_no_lines() {
        assert!(wrap_text("", 10).is_empty());
    }

    #[test]
    fn zero_width_returns_text_verbatim() {
        assert_eq!(wrap_text("a b\nc", 0), vec!["a b\nc"]);
    }

    #[test]
    fn graphemes_are_not_split() {
        let lines = wrap_text("e\u{0301}e\u{0301}e\u{0301}", 2);
        assert_eq!(lines, vec!["e\u{0301}e\u{0301}", "e\u{0301}"]);
    }

    #[test]
    fn display_width_counts_graphemes() {
        assert_eq!(display_width("SteelPlate"), 10);
        assert_eq!(display_width("e\u{0301}"), 1);
        assert_eq!(display_width(""), 0);
    }
}
