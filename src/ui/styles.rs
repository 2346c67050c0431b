//! Styles for row classes, char spans and chrome, read from the active theme.

use super::theme::current_ui;
use crate::domain::{RowClass, SpanTag};
use ratatui::style::{Modifier, Style};

/// Background and base foreground of a content row.
pub fn row_style(class: RowClass) -> Style {
    let ui = current_ui();
    let base = Style::default().fg(ui.fg_default);
    match class {
        RowClass::Equal => base.bg(ui.bg_default),
        RowClass::Added => base.bg(ui.bg_added_line),
        RowClass::Deleted => base.bg(ui.bg_deleted_line),
        RowClass::Changed => base.bg(ui.bg_changed_line),
        RowClass::Placeholder => base.bg(ui.bg_placeholder),
        RowClass::Folded { .. } => Style::default()
            .fg(ui.fg_muted)
            .bg(ui.bg_folded)
            .add_modifier(Modifier::ITALIC),
        RowClass::Notice => Style::default()
            .fg(ui.fg_muted)
            .bg(ui.bg_default)
            .add_modifier(Modifier::ITALIC),
    }
}

/// Stronger background for the characters that differ inside a changed row.
pub fn span_style(tag: SpanTag) -> Style {
    let ui = current_ui();
    match tag {
        SpanTag::Inserted => Style::default().bg(ui.bg_added_span),
        SpanTag::Deleted => Style::default().bg(ui.bg_deleted_span),
    }
}

pub fn gutter_style(class: RowClass) -> Style {
    let ui = current_ui();
    let style = row_style(class);
    match class {
        RowClass::Added => style.fg(ui.fg_added).add_modifier(Modifier::BOLD),
        RowClass::Deleted => style.fg(ui.fg_deleted).add_modifier(Modifier::BOLD),
        RowClass::Changed => style.fg(ui.fg_gutter_changed).add_modifier(Modifier::BOLD),
        RowClass::Folded { .. } => style.fg(ui.fg_muted),
        _ => style.fg(ui.fg_gutter),
    }
}

pub fn style_cursor() -> Style {
    Style::default().bg(current_ui().bg_cursor)
}

pub fn style_header() -> Style {
    let ui = current_ui();
    Style::default().fg(ui.fg_path).bg(ui.bg_header).add_modifier(Modifier::BOLD)
}

pub fn style_status() -> Style {
    let ui = current_ui();
    Style::default().fg(ui.fg_default).bg(ui.bg_status)
}

pub fn style_muted() -> Style {
    Style::default().fg(current_ui().fg_muted)
}

pub fn style_warning() -> Style {
    Style::default().fg(current_ui().fg_warning).add_modifier(Modifier::BOLD)
}

pub fn style_error() -> Style {
    Style::default().fg(current_ui().fg_error).add_modifier(Modifier::BOLD)
}

pub fn style_stat_added() -> Style {
    Style::default().fg(current_ui().fg_added).add_modifier(Modifier::BOLD)
}

pub fn style_stat_deleted() -> Style {
    Style::default().fg(current_ui().fg_deleted).add_modifier(Modifier::BOLD)
}

pub fn style_stat_changed() -> Style {
    Style::default().fg(current_ui().fg_changed).add_modifier(Modifier::BOLD)
}

pub fn style_border(focused: bool) -> Style {
    let ui = current_ui();
    if focused {
        Style::default().fg(ui.fg_border_focused)
    } else {
        Style::default().fg(ui.fg_border)
    }
}

pub fn style_overlay() -> Style {
    let ui = current_ui();
    Style::default().fg(ui.fg_default).bg(ui.bg_overlay)
}

pub fn style_key() -> Style {
    Style::default().fg(current_ui().fg_changed)
}

pub fn style_match() -> Style {
    Style::default().fg(current_ui().fg_warning).add_modifier(Modifier::BOLD)
}
