#![forbid(unsafe_code)]

//! Append-only transcript of one invocation.

use std::fmt::{self, Write as _};

/// Text accumulated by `print` calls, flushed once at the end of an invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputBuffer {
    text: String,
    lines: usize,
}

impl OutputBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` followed by a newline.
    pub fn print(&mut self, value: impl fmt::Display) {
        // Writing into a String cannot fail.
        let _ = write!(self.text, "{value}");
        self.text.push('\n');
        self.lines += 1;
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of `print` calls so far.
    #[must_use]
    pub fn prints(&self) -> usize {
        self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Move the text out, leaving the buffer empty.
    pub fn take(&mut self) -> String {
        self.lines = 0;
        std::mem::take(&mut self.text)
    }
}
