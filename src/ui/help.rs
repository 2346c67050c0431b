//! Help overlay generated from the keymap.

use crate::keymap::Keymap;
use crate::ui::layout::centered_rect;
use crate::ui::styles;
use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Padding, Paragraph},
    Frame,
};

/// Lines of the help text, one section per category.
pub fn help_lines(keymap: &Keymap) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            styles::style_header().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    for (category, entries) in keymap.help_entries() {
        lines.push(Line::from(Span::styled(
            category.display_name(),
            styles::style_muted().add_modifier(Modifier::BOLD),
        )));
        for entry in entries {
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<10}", entry.key_display), styles::style_key()),
                Span::raw(entry.description),
            ]));
        }
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled("Press any key to close", styles::style_muted())));
    lines
}

pub fn render(frame: &mut Frame, area: Rect, keymap: &Keymap) {
    let popup_area = centered_rect(55, 80, area);
    frame.render_widget(Clear, popup_area);

    let help = Paragraph::new(help_lines(keymap)).block(
        Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(styles::style_border(false))
            .padding(Padding::uniform(1))
            .style(styles::style_overlay()),
    );
    frame.render_widget(help, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::build_default_keymap;

    #[test]
    fn test_help_lists_every_category() {
        let text: Vec<String> = help_lines(&build_default_keymap())
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();

        for heading in ["Navigation", "Files & Editing", "Comparison", "General"] {
            assert!(text.iter().any(|l| l == heading), "missing {}", heading);
        }
        assert!(text.iter().any(|l| l.contains("Next difference")));
    }
}
