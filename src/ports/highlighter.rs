//! Highlighter port (trait).
//! Lexical colouring is an injected collaborator of the diff view.

use ratatui::style::Style;
use std::ops::Range;

/// Opaque lexer choice for one pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerHandle {
    pub name: String,
}

impl LexerHandle {
    pub fn plain() -> Self {
        Self {
            name: "Plain Text".to_string(),
        }
    }
}

pub trait Highlighter {
    /// Pick a lexer from an optional file name and a sample of the content.
    fn lexer_for(&self, name_hint: Option<&str>, sample: &str) -> LexerHandle;

    /// Token styles for one line (no terminator). Ranges are char offsets.
    fn highlight(&self, lexer: &LexerHandle, line: &str) -> Vec<(Range<usize>, Style)>;
}
