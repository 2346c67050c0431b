//! Syntax highlighting using two-face syntaxes and the active theme.
//! Colours follow `ui::theme`, so a theme switch applies on the next paint.

use crate::ports::{Highlighter, LexerHandle};
use crate::ui::theme;
use once_cell::sync::Lazy;
use ratatui::style::{Color, Modifier, Style};
use std::ops::Range;
use std::path::Path;
use syntect::easy::HighlightLines;
use syntect::highlighting::FontStyle;
use syntect::parsing::{SyntaxReference, SyntaxSet};

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(two_face::syntax::extra_newlines);

#[derive(Debug, Default)]
pub struct SyntectHighlighter;

impl SyntectHighlighter {
    pub fn new() -> Self {
        Self
    }

    fn syntax_named(name: &str) -> &'static SyntaxReference {
        SYNTAX_SET
            .find_syntax_by_name(name)
            .unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text())
    }
}

impl Highlighter for SyntectHighlighter {
    fn lexer_for(&self, name_hint: Option<&str>, sample: &str) -> LexerHandle {
        let by_name = name_hint.and_then(|hint| {
            let path = Path::new(hint);
            let file_name = path.file_name().and_then(|n| n.to_str());
            let extension = path.extension().and_then(|e| e.to_str());
            // Dotfiles like Makefile or .bashrc are registered by full name
            extension
                .and_then(|ext| SYNTAX_SET.find_syntax_by_extension(ext))
                .or_else(|| file_name.and_then(|n| SYNTAX_SET.find_syntax_by_extension(n)))
        });

        let syntax = by_name
            .or_else(|| {
                sample
                    .lines()
                    .next()
                    .and_then(|first| SYNTAX_SET.find_syntax_by_first_line(first))
            })
            .unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text());

        tracing::debug!(hint = ?name_hint, lexer = %syntax.name, "lexer selected");
        LexerHandle {
            name: syntax.name.clone(),
        }
    }

    fn highlight(&self, lexer: &LexerHandle, line: &str) -> Vec<(Range<usize>, Style)> {
        let syntax = Self::syntax_named(&lexer.name);
        // The newlines syntax set expects each line to end in '\n'
        let terminated = format!("{}\n", line);
        let line_len = line.chars().count();
        let result = theme::with_syntax_theme(|syntect_theme| {
            HighlightLines::new(syntax, syntect_theme).highlight_line(&terminated, &SYNTAX_SET)
        });

        let regions = match result {
            Ok(regions) => regions,
            Err(e) => {
                tracing::warn!(lexer = %lexer.name, error = %e, "highlighting failed, showing plain text");
                return Vec::new();
            }
        };

        let mut offset = 0;
        regions
            .into_iter()
            .filter_map(|(style, text)| {
                let len = text.chars().count();
                let range = offset.min(line_len)..(offset + len).min(line_len);
                offset += len;
                if range.is_empty() {
                    return None;
                }

                let fg = Color::Rgb(style.foreground.r, style.foreground.g, style.foreground.b);
                let mut ratatui_style = Style::default().fg(fg);
                if style.font_style.contains(FontStyle::BOLD) {
                    ratatui_style = ratatui_style.add_modifier(Modifier::BOLD);
                }
                if style.font_style.contains(FontStyle::ITALIC) {
                    ratatui_style = ratatui_style.add_modifier(Modifier::ITALIC);
                }
                Some((range, ratatui_style))
            })
            .collect()
    }
}
