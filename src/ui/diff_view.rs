//! Side-by-side diff view: gutter and content surfaces for both files.
//! Highlighting is cached when the surfaces are painted, not on every frame.

use crate::domain::{AlignedRows, CharSpan, RowClass, RowRecord, ScrollSync, Side, Surface};
use crate::ports::{Highlighter, LexerHandle};
use crate::ui::styles;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};
use std::ops::Range;

/// Gutters never shrink below four digits.
const MIN_GUTTER_DIGITS: usize = 4;
const FOLD_MARKER: &str = "⋯";

/// The four painted surfaces of one render pass.
#[derive(Debug, Clone, Default)]
pub struct Surfaces {
    gutters: [Vec<Line<'static>>; 2],
    contents: [Vec<Line<'static>>; 2],
    digits: usize,
}

impl Surfaces {
    pub fn gutter(&self, side: Side) -> &[Line<'static>] {
        &self.gutters[side.index()]
    }

    pub fn content(&self, side: Side) -> &[Line<'static>] {
        &self.contents[side.index()]
    }

    pub fn len(&self) -> usize {
        self.contents[0].len()
    }

    /// Columns taken by each gutter: the widest line number and a space.
    pub fn gutter_width(&self) -> u16 {
        u16::try_from(self.digits.max(MIN_GUTTER_DIGITS) + 1).unwrap_or(u16::MAX)
    }
}

/// Where each surface landed on screen in the last frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaneRects {
    pub gutter_a: Rect,
    pub content_a: Rect,
    pub gutter_b: Rect,
    pub content_b: Rect,
}

impl PaneRects {
    pub fn get(&self, surface: Surface) -> Rect {
        match surface {
            Surface::GutterA => self.gutter_a,
            Surface::ContentA => self.content_a,
            Surface::GutterB => self.gutter_b,
            Surface::ContentB => self.content_b,
        }
    }

    /// The surface under a screen cell, if any.
    pub fn hit(&self, column: u16, row: u16) -> Option<Surface> {
        Surface::ALL.into_iter().find(|s| {
            let r = self.get(*s);
            column >= r.x && column < r.x + r.width && row >= r.y && row < r.y + r.height
        })
    }

    pub fn viewport_height(&self) -> usize {
        self.content_a.height as usize
    }
}

/// Paint every row of both panes from scratch.
pub fn paint(
    rows: &AlignedRows,
    highlighter: &dyn Highlighter,
    lexers: [&LexerHandle; 2],
    tab_width: usize,
) -> Surfaces {
    let digits = gutter_digits(rows);
    let mut surfaces = Surfaces {
        digits,
        ..Default::default()
    };
    for side in [Side::A, Side::B] {
        let lexer = lexers[side.index()];
        let pane = rows.pane(side);
        surfaces.gutters[side.index()] = pane.iter().map(|record| paint_gutter_row(record, digits)).collect();
        surfaces.contents[side.index()] = pane
            .iter()
            .map(|record| paint_content_row(record, highlighter, lexer, tab_width))
            .collect();
    }
    tracing::debug!(rows = rows.len(), "surfaces painted");
    surfaces
}

fn gutter_digits(rows: &AlignedRows) -> usize {
    [Side::A, Side::B]
        .iter()
        .flat_map(|side| rows.pane(*side).iter())
        .filter_map(|record| record.line_number)
        .max()
        .map_or(MIN_GUTTER_DIGITS, |n| n.to_string().len().max(MIN_GUTTER_DIGITS))
}

fn paint_gutter_row(record: &RowRecord, digits: usize) -> Line<'static> {
    let text = match (record.line_number, record.class) {
        (Some(n), _) => format!("{:>digits$} ", n),
        (None, RowClass::Folded { .. }) => format!("{:>digits$} ", FOLD_MARKER),
        (None, _) => " ".repeat(digits + 1),
    };
    Line::from(Span::styled(text, styles::gutter_style(record.class)))
}

fn paint_content_row(
    record: &RowRecord,
    highlighter: &dyn Highlighter,
    lexer: &LexerHandle,
    tab_width: usize,
) -> Line<'static> {
    let base = styles::row_style(record.class);
    match record.class {
        RowClass::Folded { hidden } => {
            let label = format!("{} {} unchanged lines {}", FOLD_MARKER, hidden, FOLD_MARKER);
            Line::from(Span::styled(label, base)).style(base)
        }
        RowClass::Placeholder => Line::default().style(base),
        RowClass::Notice => {
            let text = record.text().unwrap_or_default().to_string();
            Line::from(Span::styled(text, base)).style(base)
        }
        _ => {
            let text = record.text().unwrap_or_default();
            let tokens = highlighter.highlight(lexer, text);
            let spans = styled_segments(text, &tokens, &record.char_spans, base, tab_width)
                .into_iter()
                .map(|(text, style)| Span::styled(text, style))
                .collect::<Vec<_>>();
            Line::from(spans).style(base)
        }
    }
}

/// Split a line into runs of identical style.
///
/// Layering, lowest first: the row style, token foregrounds, then the
/// stronger char-span backgrounds. Tabs expand to `tab_width` spaces.
pub fn styled_segments(
    text: &str,
    tokens: &[(Range<usize>, Style)],
    spans: &[CharSpan],
    base: Style,
    tab_width: usize,
) -> Vec<(String, Style)> {
    let mut segments: Vec<(String, Style)> = Vec::new();
    let mut token_iter = tokens.iter().peekable();

    for (i, ch) in text.chars().enumerate() {
        while token_iter.peek().is_some_and(|(range, _)| range.end <= i) {
            token_iter.next();
        }

        let mut style = base;
        if let Some((range, token_style)) = token_iter.peek() {
            if range.start <= i {
                style = style.patch(*token_style);
            }
        }
        if let Some(span) = spans.iter().find(|s| s.contains(i)) {
            style = style.patch(styles::span_style(span.tag));
        }

        let mut push = |c: char| match segments.last_mut() {
            Some((run, run_style)) if *run_style == style => run.push(c),
            _ => segments.push((c.to_string(), style)),
        };
        if ch == '\t' {
            (0..tab_width).for_each(|_| push(' '));
        } else {
            push(ch);
        }
    }

    segments
}

/// Split the diff area into two bordered panes with a gutter each.
pub fn split_panes(area: Rect, gutter_width: u16) -> PaneRects {
    let halves = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).split(area);
    let [gutter_a, content_a] = pane_columns(Block::default().borders(Borders::ALL).inner(halves[0]), gutter_width);
    let [gutter_b, content_b] = pane_columns(Block::default().borders(Borders::ALL).inner(halves[1]), gutter_width);
    PaneRects {
        gutter_a,
        content_a,
        gutter_b,
        content_b,
    }
}

fn pane_columns(inner: Rect, gutter_width: u16) -> [Rect; 2] {
    let cols = Layout::horizontal([Constraint::Length(gutter_width), Constraint::Min(1)]).split(inner);
    [cols[0], cols[1]]
}

/// What the view needs from the app for one frame.
pub struct DiffViewProps<'a> {
    pub surfaces: &'a Surfaces,
    pub sync: &'a ScrollSync,
    pub titles: [String; 2],
    pub focus: Side,
    pub cursor: usize,
}

pub fn render(frame: &mut Frame, area: Rect, props: &DiffViewProps) -> PaneRects {
    let rects = split_panes(area, props.surfaces.gutter_width());
    let halves = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).split(area);

    for side in [Side::A, Side::B] {
        let focused = side == props.focus;
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(styles::style_border(focused))
            .title(Span::styled(
                format!(" {} ", props.titles[side.index()]),
                styles::style_header(),
            ));
        frame.render_widget(block, halves[side.index()]);

        let (gutter_surface, content_surface) = match side {
            Side::A => (Surface::GutterA, Surface::ContentA),
            Side::B => (Surface::GutterB, Surface::ContentB),
        };

        let cursor = focused.then_some(props.cursor);
        render_surface(
            frame,
            rects.get(gutter_surface),
            props.surfaces.gutter(side),
            props.sync.offset(gutter_surface),
            0,
            cursor,
        );
        render_surface(
            frame,
            rects.get(content_surface),
            props.surfaces.content(side),
            props.sync.offset(content_surface),
            props.sync.horizontal(side),
            None,
        );
    }

    let height = rects.viewport_height();
    if props.surfaces.len() > height {
        render_scrollbar(frame, halves[1], props.surfaces.len(), props.sync.offset(Surface::ContentB));
    }

    rects
}

fn render_surface(
    frame: &mut Frame,
    area: Rect,
    lines: &[Line<'static>],
    offset: usize,
    horizontal: usize,
    cursor: Option<usize>,
) {
    let end = (offset + area.height as usize).min(lines.len());
    let start = offset.min(end);
    let visible: Vec<Line> = lines[start..end]
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if cursor == Some(start + i) {
                line.clone()
                    .patch_style(styles::style_cursor().add_modifier(Modifier::REVERSED))
            } else {
                line.clone()
            }
        })
        .collect();

    let scroll_x = u16::try_from(horizontal).unwrap_or(u16::MAX);
    frame.render_widget(Paragraph::new(visible).scroll((0, scroll_x)), area);
}

fn render_scrollbar(frame: &mut Frame, area: Rect, total_lines: usize, scroll: usize) {
    let scrollbar = Scrollbar::default()
        .orientation(ScrollbarOrientation::VerticalRight)
        .begin_symbol(None)
        .end_symbol(None)
        .track_symbol(Some(" "))
        .thumb_symbol("█");
    let mut scrollbar_state = ScrollbarState::new(total_lines).position(scroll);
    frame.render_stateful_widget(scrollbar, area, &mut scrollbar_state);
}
