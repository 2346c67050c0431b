//! Frame composition: header, status bar, prompt line and search overlay.

use crate::app::{MessageLevel, StatusMessage};
use crate::domain::{DiffStats, LayoutOptions, Side};
use crate::search::FuzzySearchState;
use crate::ui::styles;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Padding, Paragraph},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Header, diff body and status line.
pub fn split_frame(area: Rect) -> [Rect; 3] {
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .split(area);
    [chunks[0], chunks[1], chunks[2]]
}

pub struct HeaderInfo<'a> {
    pub titles: [&'a str; 2],
    pub stats: Option<DiffStats>,
    pub theme: &'a str,
}

pub fn render_header(frame: &mut Frame, area: Rect, info: &HeaderInfo) {
    let mut right_spans = Vec::new();
    if let Some(stats) = info.stats {
        if stats.is_identical() {
            right_spans.push(Span::styled("identical", styles::style_muted()));
        } else {
            right_spans.push(Span::styled(format!("+{}", stats.added), styles::style_stat_added()));
            right_spans.push(Span::raw(" "));
            right_spans.push(Span::styled(format!("-{}", stats.deleted), styles::style_stat_deleted()));
            right_spans.push(Span::raw(" "));
            right_spans.push(Span::styled(format!("~{}", stats.changed), styles::style_stat_changed()));
        }
        right_spans.push(Span::raw("  "));
    }
    right_spans.push(Span::styled(format!("{} ", info.theme), styles::style_muted()));

    let right_width: usize = right_spans.iter().map(|s| s.content.width()).sum();
    let budget = (area.width as usize).saturating_sub(right_width + 6) / 2;
    let left_spans = vec![
        Span::raw(" "),
        Span::styled(truncate_left(info.titles[0], budget), styles::style_header()),
        Span::styled(" ↔ ", styles::style_muted()),
        Span::styled(truncate_left(info.titles[1], budget), styles::style_header()),
    ];

    let left_width: usize = left_spans.iter().map(|s| s.content.width()).sum();
    let padding = (area.width as usize).saturating_sub(left_width + right_width);

    let mut spans = left_spans;
    spans.push(Span::raw(" ".repeat(padding)));
    spans.extend(right_spans);
    frame.render_widget(Paragraph::new(Line::from(spans)).style(styles::style_status()), area);
}

pub struct StatusInfo<'a> {
    pub focus: Side,
    pub cursor_line: Option<usize>,
    pub options: LayoutOptions,
    pub message: Option<&'a StatusMessage>,
}

pub fn render_status_bar(frame: &mut Frame, area: Rect, info: &StatusInfo) {
    let mut left_spans = vec![Span::styled(
        format!(" {} ", info.focus.label()),
        styles::style_header(),
    )];
    if let Some(line) = info.cursor_line {
        left_spans.push(Span::styled(format!(" L{} ", line), styles::style_muted()));
    }

    add_toggle(&mut left_spans, "Fold", "z", info.options.fold.enabled);
    add_toggle(&mut left_spans, "Case", "i", info.options.diff.ignore_case);
    add_toggle(&mut left_spans, "Space", "s", info.options.diff.ignore_whitespace);
    add_toggle(&mut left_spans, "EOL", "E", info.options.diff.normalize_line_endings);

    let mut center_spans = Vec::new();
    if let Some(message) = info.message {
        let style = match message.level {
            MessageLevel::Info => styles::style_warning(),
            MessageLevel::Error => styles::style_error(),
        };
        center_spans.push(Span::styled(message.text.clone(), style));
    }

    let right_spans = vec![
        Span::styled("? ", styles::style_key()),
        Span::styled("Help ", styles::style_muted()),
        Span::styled("q ", styles::style_key()),
        Span::styled("Quit ", styles::style_muted()),
    ];

    let left_width: usize = left_spans.iter().map(|s| s.content.width()).sum();
    let center_width: usize = center_spans.iter().map(|s| s.content.width()).sum();
    let right_width: usize = right_spans.iter().map(|s| s.content.width()).sum();
    let remaining = (area.width as usize).saturating_sub(left_width + center_width + right_width);
    let left_pad = remaining / 2;

    let mut spans = left_spans;
    spans.push(Span::raw(" ".repeat(left_pad)));
    spans.extend(center_spans);
    spans.push(Span::raw(" ".repeat(remaining - left_pad)));
    spans.extend(right_spans);
    frame.render_widget(Paragraph::new(Line::from(spans)).style(styles::style_status()), area);
}

fn add_toggle(spans: &mut Vec<Span<'static>>, label: &'static str, key: &'static str, active: bool) {
    let style = if active {
        styles::style_header()
    } else {
        styles::style_muted()
    };
    spans.push(Span::styled(format!(" {}", label), style));
    spans.push(Span::styled(format!(":{} ", key), styles::style_key()));
}

/// One-line input in place of the status bar. `cursor` counts chars.
pub fn render_prompt(frame: &mut Frame, area: Rect, label: &str, text: &str, cursor: usize) {
    let prefix = format!(" {}: ", label);
    let line = Line::from(vec![
        Span::styled(prefix.clone(), styles::style_key()),
        Span::raw(text.to_string()),
    ]);
    frame.render_widget(Paragraph::new(line).style(styles::style_status()), area);

    let before: String = text.chars().take(cursor).collect();
    let x = (prefix.width() + before.width()).min(area.width.saturating_sub(1) as usize);
    frame.set_cursor_position((area.x + x as u16, area.y));
}

pub fn render_search(frame: &mut Frame, area: Rect, state: &mut FuzzySearchState) {
    let popup_area = centered_rect(70, 60, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" Search ")
        .borders(Borders::ALL)
        .border_style(styles::style_border(true))
        .padding(Padding::horizontal(1))
        .style(styles::style_overlay());
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let [input_area, list_area] = {
        let chunks = Layout::vertical([Constraint::Length(2), Constraint::Min(1)]).split(inner);
        [chunks[0], chunks[1]]
    };

    let input = Line::from(vec![
        Span::styled("/ ", styles::style_key()),
        Span::raw(state.query.clone()),
        Span::styled("█", styles::style_muted()),
    ]);
    frame.render_widget(Paragraph::new(input), input_area);

    let visible = list_area.height as usize;
    state.ensure_visible(visible);

    let mut lines = Vec::new();
    for (i, result) in state.results.iter().enumerate().skip(state.scroll).take(visible) {
        let entry = &result.entry;
        let mut spans = vec![Span::styled(
            format!("{} {:>4}  ", entry.side.label(), entry.line_number),
            styles::style_muted(),
        )];
        for (ci, ch) in entry.content.chars().enumerate() {
            let style = if result.match_indices.contains(&(ci as u32)) {
                styles::style_match()
            } else {
                styles::style_overlay()
            };
            spans.push(Span::styled(ch.to_string(), style));
        }

        let mut line = Line::from(spans);
        if i == state.selected_index {
            line = line.patch_style(styles::style_cursor().add_modifier(Modifier::BOLD));
        }
        lines.push(line);
    }
    if lines.is_empty() && !state.query.is_empty() {
        lines.push(Line::from(Span::styled("No matches", styles::style_muted())));
    }
    frame.render_widget(Paragraph::new(lines), list_area);
}

/// Keep the end of `text`, the part of a path that tells files apart.
pub fn truncate_left(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let mut kept = Vec::new();
    let mut width = 1; // leading ellipsis
    for ch in text.chars().rev() {
        let w = ch.width().unwrap_or(0);
        if width + w > max_width {
            break;
        }
        width += w;
        kept.push(ch);
    }
    std::iter::once('…').chain(kept.into_iter().rev()).collect()
}

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(r);

    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(popup_layout[1])[1]
}
