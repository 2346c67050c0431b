//! Picker overlay for recently compared file pairs.

use crate::ports::RecentPair;
use crate::ui::layout::centered_rect;
use crate::ui::styles;
use chrono::{DateTime, Utc};
use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding},
    Frame,
};

/// Human-readable age of a millisecond timestamp relative to `now`.
pub fn relative_time(opened_at_ms: i64, now: DateTime<Utc>) -> String {
    let Some(opened) = DateTime::<Utc>::from_timestamp_millis(opened_at_ms) else {
        return "unknown".to_string();
    };
    let secs = (now - opened).num_seconds();

    let plural = |n: i64, unit: &str| format!("{} {}{} ago", n, unit, if n == 1 { "" } else { "s" });
    if secs < 60 {
        "just now".to_string()
    } else if secs < 3600 {
        plural(secs / 60, "minute")
    } else if secs < 86_400 {
        plural(secs / 3600, "hour")
    } else if secs < 604_800 {
        plural(secs / 86_400, "day")
    } else if secs < 2_592_000 {
        plural(secs / 604_800, "week")
    } else {
        plural(secs / 2_592_000, "month")
    }
}

pub fn render(frame: &mut Frame, area: Rect, pairs: &[RecentPair], selected: usize) {
    let popup_area = centered_rect(70, 50, area);
    frame.render_widget(Clear, popup_area);

    let now = Utc::now();
    let items: Vec<ListItem> = if pairs.is_empty() {
        vec![ListItem::new(Line::from(Span::styled(
            "No recent comparisons",
            styles::style_muted(),
        )))]
    } else {
        pairs
            .iter()
            .map(|pair| {
                ListItem::new(Line::from(vec![
                    Span::raw(pair.a.display().to_string()),
                    Span::styled("  ↔  ", styles::style_muted()),
                    Span::raw(pair.b.display().to_string()),
                    Span::styled(
                        format!("  {}", relative_time(pair.opened_at, now)),
                        styles::style_muted(),
                    ),
                ]))
            })
            .collect()
    };

    let list = List::new(items)
        .block(
            Block::default()
                .title(" Recent comparisons ")
                .borders(Borders::ALL)
                .border_style(styles::style_border(true))
                .padding(Padding::horizontal(1))
                .style(styles::style_overlay()),
        )
        .highlight_style(styles::style_cursor().add_modifier(Modifier::BOLD))
        .highlight_symbol("▸ ");

    let mut state = ListState::default();
    if !pairs.is_empty() {
        state.select(Some(selected.min(pairs.len() - 1)));
    }
    frame.render_stateful_widget(list, popup_area, &mut state);
}
