//! Application state and the event loop.
//!
//! The app owns the two line sequences and replaces them wholesale on load,
//! edit commit and save. Every diff-affecting event recomputes the layout and
//! repaints the surfaces; scroll sync is flushed once per loop tick.

use crate::config::{self, Settings};
use crate::domain::{
    compute_layout, locate_line, next_diff_block, prev_diff_block, single_side, DiffLayout,
    LineSequence, ScrollSync, Side, Surface,
};
use crate::keymap::{build_default_keymap, Action, Context, Keymap};
use crate::ports::{
    remember, FileStore, Highlighter, HistoryStore, KeyCode, KeyModifiers, LexerHandle,
    MouseEvent, MouseKind, RecentPair, Terminal, TerminalEvent,
};
use crate::search::{build_search_index, FuzzySearchState, SearchableEntry};
use crate::ui::diff_view::{self, DiffViewProps, PaneRects, Surfaces};
use crate::ui::layout::{self as frame_layout, HeaderInfo, StatusInfo};
use crate::ui::{help, history, theme};
use anyhow::Result;
use ratatui::Frame;
use std::path::{Path, PathBuf};
use std::time::Duration;

const LEXER_SAMPLE_LINES: usize = 20;
const SEARCH_MAX_RESULTS: usize = 200;
const HORIZONTAL_STEP: isize = 4;
const WHEEL_STEP: isize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Error,
}

/// One-line feedback shown in the status bar until the next message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub level: MessageLevel,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: MessageLevel::Info,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: MessageLevel::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    GotoLine,
    /// `index` is the 0-based line in that side's sequence.
    EditLine { side: Side, index: usize },
}

impl PromptKind {
    fn label(self) -> String {
        match self {
            PromptKind::GotoLine => "Go to line".to_string(),
            PromptKind::EditLine { side, index } => format!("Edit {}:{}", side.label(), index + 1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Help,
    Prompt(PromptKind),
    Search,
    History,
}

/// Editable single-line buffer. The cursor counts chars, not bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputLine {
    text: String,
    cursor: usize,
}

impl InputLine {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            cursor: text.chars().count(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map_or(self.text.len(), |(i, _)| i)
    }

    pub fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.text.remove(at);
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.chars().count() {
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.text.chars().count();
    }
}

/// One side of the comparison.
#[derive(Debug)]
struct Pane {
    path: Option<PathBuf>,
    lines: Option<LineSequence>,
    lexer: LexerHandle,
    dirty: bool,
}

impl Pane {
    fn empty() -> Self {
        Self {
            path: None,
            lines: None,
            lexer: LexerHandle::plain(),
            dirty: false,
        }
    }

    fn title(&self) -> String {
        let name = self
            .path
            .as_ref()
            .map_or_else(|| "(no file)".to_string(), |p| p.display().to_string());
        if self.dirty {
            format!("{} [+]", name)
        } else {
            name
        }
    }
}

pub struct App {
    files: Box<dyn FileStore>,
    history: Box<dyn HistoryStore>,
    highlighter: Box<dyn Highlighter>,
    keymap: Keymap,
    pub settings: Settings,
    settings_path: Option<PathBuf>,
    panes: [Pane; 2],
    pub layout: DiffLayout,
    surfaces: Surfaces,
    pub sync: ScrollSync,
    rects: PaneRects,
    pub focus: Side,
    pub cursor: usize,
    pub mode: Mode,
    pub input: InputLine,
    pub search: FuzzySearchState,
    search_index: Vec<SearchableEntry>,
    recent: Vec<RecentPair>,
    history_selected: usize,
    pub message: Option<StatusMessage>,
    pub should_quit: bool,
}

impl App {
    /// `settings_path` is where a theme change is persisted; `None` keeps
    /// settings in memory only.
    pub fn new(
        files: Box<dyn FileStore>,
        history: Box<dyn HistoryStore>,
        highlighter: Box<dyn Highlighter>,
        settings: Settings,
        settings_path: Option<PathBuf>,
    ) -> Self {
        Self {
            files,
            history,
            highlighter,
            keymap: build_default_keymap(),
            settings,
            settings_path,
            panes: [Pane::empty(), Pane::empty()],
            layout: DiffLayout::default(),
            surfaces: Surfaces::default(),
            sync: ScrollSync::new(),
            rects: PaneRects::default(),
            focus: Side::A,
            cursor: 0,
            mode: Mode::Normal,
            input: InputLine::default(),
            search: FuzzySearchState::new(),
            search_index: Vec::new(),
            recent: Vec::new(),
            history_selected: 0,
            message: None,
            should_quit: false,
        }
    }

    pub fn run<T: Terminal>(&mut self, terminal: &mut T) -> Result<()> {
        while !self.should_quit {
            // Surfaces must agree before anything is drawn
            self.sync.flush();
            self.draw(terminal)?;

            if let Some(event) = terminal.poll_event(Duration::from_millis(100))? {
                self.handle_event(event);
            }
        }
        Ok(())
    }

    fn draw<T: Terminal>(&mut self, terminal: &mut T) -> Result<()> {
        let mut rects = PaneRects::default();
        terminal.draw(|frame| rects = self.render(frame))?;
        self.rects = rects;
        self.sync
            .set_extent_all(self.surfaces.len(), rects.viewport_height());
        Ok(())
    }

    pub fn render(&mut self, frame: &mut Frame) -> PaneRects {
        let area = frame.area();
        let [header_area, body_area, status_area] = frame_layout::split_frame(area);

        let titles = [self.panes[0].title(), self.panes[1].title()];
        let theme_name = theme::current_name();
        frame_layout::render_header(
            frame,
            header_area,
            &HeaderInfo {
                titles: [titles[0].as_str(), titles[1].as_str()],
                stats: self.both_loaded().then_some(self.layout.stats),
                theme: &theme_name,
            },
        );

        let rects = diff_view::render(
            frame,
            body_area,
            &DiffViewProps {
                surfaces: &self.surfaces,
                sync: &self.sync,
                titles,
                focus: self.focus,
                cursor: self.cursor,
            },
        );

        match self.mode {
            Mode::Prompt(kind) => frame_layout::render_prompt(
                frame,
                status_area,
                &kind.label(),
                self.input.text(),
                self.input.cursor(),
            ),
            _ => frame_layout::render_status_bar(
                frame,
                status_area,
                &StatusInfo {
                    focus: self.focus,
                    cursor_line: self.cursor_line(),
                    options: self.settings.layout_options(),
                    message: self.message.as_ref(),
                },
            ),
        }

        match self.mode {
            Mode::Help => help::render(frame, area, &self.keymap),
            Mode::Search => frame_layout::render_search(frame, body_area, &mut self.search),
            Mode::History => history::render(frame, body_area, &self.recent, self.history_selected),
            Mode::Normal | Mode::Prompt(_) => {}
        }

        rects
    }

    pub fn handle_event(&mut self, event: TerminalEvent) {
        match event {
            TerminalEvent::Key(key) => self.handle_key(key.code, key.modifiers),
            TerminalEvent::Mouse(mouse) => self.handle_mouse(mouse),
            TerminalEvent::Resize(_, _) => {}
        }
    }

    fn active_contexts(&self) -> Vec<Context> {
        let specific = match self.mode {
            Mode::Normal => Context::DiffView,
            Mode::Help => Context::Help,
            Mode::Prompt(_) => Context::Prompt,
            Mode::Search => Context::Search,
            Mode::History => Context::History,
        };
        vec![Context::Global, specific]
    }

    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        let contexts = self.active_contexts();
        if let Some(action) = self.keymap.lookup(code, modifiers, &contexts) {
            self.handle_action(action);
            return;
        }

        // Any unbound key closes help
        if self.mode == Mode::Help {
            self.mode = Mode::Normal;
            return;
        }

        let typed = match code {
            KeyCode::Char(c) if !modifiers.ctrl && !modifiers.alt => c,
            _ => return,
        };
        if !contexts.iter().any(|c| c.accepts_text()) {
            return;
        }
        match self.mode {
            Mode::Search => {
                self.search.query.push(typed);
                self.search.refresh(&self.search_index, SEARCH_MAX_RESULTS);
            }
            _ => self.input.insert(typed),
        }
    }

    fn handle_action(&mut self, action: Action) {
        match action {
            Action::MoveDown => self.move_cursor(1),
            Action::MoveUp => self.move_cursor(-1),
            Action::HalfPageDown => self.move_cursor(self.page_rows() / 2),
            Action::HalfPageUp => self.move_cursor(-(self.page_rows() / 2)),
            Action::PageDown => self.move_cursor(self.page_rows()),
            Action::PageUp => self.move_cursor(-self.page_rows()),
            Action::GotoTop => self.set_cursor(0),
            Action::GotoBottom => self.set_cursor(self.layout.rows.len().saturating_sub(1)),
            Action::ScrollLeft => self.sync.scroll_horizontal(self.focus, -HORIZONTAL_STEP),
            Action::ScrollRight => self.sync.scroll_horizontal(self.focus, HORIZONTAL_STEP),
            Action::NextDiff => self.jump_diff(true),
            Action::PrevDiff => self.jump_diff(false),
            Action::GotoLine => self.open_prompt(PromptKind::GotoLine, ""),
            Action::SwitchSide => self.focus = self.focus.other(),

            Action::EditLine => self.begin_edit(),
            Action::Save => self.save_focused(),
            Action::Reload => self.reload(),
            Action::OpenHistory => self.open_history(),

            Action::ToggleFold => {
                self.settings.fold.enabled = !self.settings.fold.enabled;
                self.option_changed("Fold unchanged", self.settings.fold.enabled);
            }
            Action::ToggleIgnoreCase => {
                self.settings.diff.ignore_case = !self.settings.diff.ignore_case;
                self.option_changed("Ignore case", self.settings.diff.ignore_case);
            }
            Action::ToggleIgnoreWhitespace => {
                self.settings.diff.ignore_whitespace = !self.settings.diff.ignore_whitespace;
                self.option_changed("Ignore whitespace", self.settings.diff.ignore_whitespace);
            }
            Action::ToggleNormalizeEol => {
                self.settings.diff.normalize_line_endings = !self.settings.diff.normalize_line_endings;
                self.option_changed("Normalize line endings", self.settings.diff.normalize_line_endings);
            }
            Action::CycleTheme => self.cycle_theme(),

            Action::OpenSearch => {
                self.search_index = build_search_index(&self.layout.rows);
                self.search = FuzzySearchState::new();
                self.mode = Mode::Search;
            }
            Action::ShowHelp => self.mode = Mode::Help,
            Action::DismissHelp | Action::CloseOverlay | Action::CancelInput => self.mode = Mode::Normal,
            Action::Quit => self.should_quit = true,

            Action::SubmitInput => self.submit_prompt(),
            Action::InputBackspace => match self.mode {
                Mode::Search => {
                    self.search.query.pop();
                    self.search.refresh(&self.search_index, SEARCH_MAX_RESULTS);
                }
                _ => self.input.backspace(),
            },
            Action::InputDelete => self.input.delete(),
            Action::InputLeft => self.input.left(),
            Action::InputRight => self.input.right(),
            Action::InputHome => self.input.home(),
            Action::InputEnd => self.input.end(),

            Action::SelectNext => match self.mode {
                Mode::History => {
                    self.history_selected =
                        (self.history_selected + 1).min(self.recent.len().saturating_sub(1));
                }
                _ => self.search.select_next(),
            },
            Action::SelectPrev => match self.mode {
                Mode::History => self.history_selected = self.history_selected.saturating_sub(1),
                _ => self.search.select_prev(),
            },
            Action::ConfirmSelection => self.confirm_selection(),
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.mode != Mode::Normal {
            return;
        }
        let Some(surface) = self.rects.hit(mouse.column, mouse.row) else {
            return;
        };
        match mouse.kind {
            MouseKind::ScrollUp => self.sync.scroll_by(surface, -WHEEL_STEP),
            MouseKind::ScrollDown => self.sync.scroll_by(surface, WHEEL_STEP),
            MouseKind::ScrollLeft => self.sync.scroll_horizontal(surface.side(), -HORIZONTAL_STEP),
            MouseKind::ScrollRight => self.sync.scroll_horizontal(surface.side(), HORIZONTAL_STEP),
        }
    }

    // --- loading and diffing -------------------------------------------

    /// Load a new pair and show it from the top. A pair where both sides
    /// loaded is recorded in the recent list.
    pub fn open_pair(&mut self, a: Option<PathBuf>, b: Option<PathBuf>) {
        self.message = None;
        self.panes[0].path = a;
        self.panes[1].path = b;
        let loaded_a = self.load_side(Side::A);
        let loaded_b = self.load_side(Side::B);

        self.sync.reset();
        self.cursor = 0;
        self.recompute();

        if loaded_a && loaded_b {
            self.record_history();
        }
        if self.panes.iter().all(|p| p.path.is_none()) {
            self.message = Some(StatusMessage::info("No files given. Press o for recent comparisons"));
        }
    }

    pub fn reload(&mut self) {
        self.message = None;
        let ok = [self.load_side(Side::A), self.load_side(Side::B)];
        self.recompute();
        if ok.iter().all(|loaded| *loaded) && self.message.is_none() {
            self.message = Some(StatusMessage::info("Reloaded"));
        }
    }

    /// Read one side from disk. A failure clears that side only.
    fn load_side(&mut self, side: Side) -> bool {
        let pane = &mut self.panes[side.index()];
        pane.dirty = false;
        let Some(path) = pane.path.clone() else {
            pane.lines = None;
            return false;
        };

        match self.files.load(&path) {
            Ok(lines) => {
                let sample: String = lines.lines().iter().take(LEXER_SAMPLE_LINES).map(String::as_str).collect();
                let hint = path.to_str();
                pane.lexer = self.highlighter.lexer_for(hint, &sample);
                tracing::info!(side = side.label(), path = %path.display(), lines = lines.len(), "loaded file");
                pane.lines = Some(lines);
                true
            }
            Err(e) => {
                tracing::warn!(side = side.label(), path = %e.path().display(), error = %e, "load failed");
                pane.lines = None;
                pane.lexer = LexerHandle::plain();
                self.message = Some(StatusMessage::error(e.to_string()));
                false
            }
        }
    }

    fn both_loaded(&self) -> bool {
        self.panes.iter().all(|p| p.lines.is_some())
    }

    /// Rebuild the layout from the current sequences. A contract violation
    /// keeps the previous render on screen.
    pub fn recompute(&mut self) {
        let options = self.settings.layout_options();
        let result = match (&self.panes[0].lines, &self.panes[1].lines) {
            (Some(a), Some(b)) => compute_layout(a, b, &options),
            (Some(a), None) => Ok(DiffLayout {
                rows: single_side(Side::A, a),
                ..Default::default()
            }),
            (None, Some(b)) => Ok(DiffLayout {
                rows: single_side(Side::B, b),
                ..Default::default()
            }),
            (None, None) => Ok(DiffLayout::default()),
        };

        match result {
            Ok(layout) => {
                tracing::debug!(ops = layout.ops.len(), rows = layout.rows.len(), stats = %layout.stats, "layout computed");
                self.layout = layout;
                self.cursor = self.cursor.min(self.layout.rows.len().saturating_sub(1));
                self.repaint();
            }
            Err(e) => {
                tracing::error!(error = %e, "layout aborted");
                self.message = Some(StatusMessage::error(format!("Render aborted: {}", e)));
            }
        }
    }

    fn repaint(&mut self) {
        self.surfaces = diff_view::paint(
            &self.layout.rows,
            self.highlighter.as_ref(),
            [&self.panes[0].lexer, &self.panes[1].lexer],
            self.settings.tab_width,
        );
        self.sync
            .set_extent_all(self.surfaces.len(), self.rects.viewport_height());
    }

    fn option_changed(&mut self, label: &str, enabled: bool) {
        self.message = Some(StatusMessage::info(format!(
            "{}: {}",
            label,
            if enabled { "on" } else { "off" }
        )));
        self.recompute();
    }

    // --- navigation ------------------------------------------------------

    fn page_rows(&self) -> isize {
        self.rects.viewport_height().max(2) as isize
    }

    fn move_cursor(&mut self, delta: isize) {
        self.set_cursor(self.cursor.saturating_add_signed(delta));
    }

    fn set_cursor(&mut self, row: usize) {
        self.cursor = row.min(self.layout.rows.len().saturating_sub(1));
        self.sync.reveal(Surface::content(self.focus), self.cursor);
    }

    fn cursor_line(&self) -> Option<usize> {
        self.layout
            .rows
            .row(self.focus, self.cursor)
            .and_then(|r| r.line_number)
    }

    fn jump_diff(&mut self, forward: bool) {
        let target = if forward {
            next_diff_block(&self.layout.rows, self.cursor)
        } else {
            prev_diff_block(&self.layout.rows, self.cursor)
        };
        match target {
            Some(row) => self.set_cursor(row),
            None => self.message = Some(StatusMessage::info("No differences")),
        }
    }

    fn goto_line(&mut self, text: &str) {
        let Ok(line_number) = text.trim().parse::<usize>() else {
            self.message = Some(StatusMessage::error(format!("Not a line number: {}", text.trim())));
            return;
        };

        match locate_line(&self.layout.rows, self.focus, line_number) {
            Some(location) => {
                self.focus = location.side;
                self.set_cursor(location.row);
            }
            None => {
                tracing::debug!(line_number, "go to line: not shown");
                self.message = Some(StatusMessage::info(format!(
                    "Line {} is not shown (folded or out of range)",
                    line_number
                )));
            }
        }
    }

    // --- prompts and overlays ---------------------------------------------

    fn open_prompt(&mut self, kind: PromptKind, initial: &str) {
        self.input = InputLine::new(initial);
        self.mode = Mode::Prompt(kind);
    }

    fn submit_prompt(&mut self) {
        let Mode::Prompt(kind) = self.mode else {
            return;
        };
        self.mode = Mode::Normal;
        let text = self.input.text().to_string();
        match kind {
            PromptKind::GotoLine => self.goto_line(&text),
            PromptKind::EditLine { side, index } => self.commit_edit(side, index, &text),
        }
    }

    fn confirm_selection(&mut self) {
        match self.mode {
            Mode::Search => {
                self.mode = Mode::Normal;
                if let Some(entry) = self.search.selected().map(|r| r.entry.clone()) {
                    self.focus = entry.side;
                    self.set_cursor(entry.row);
                }
            }
            Mode::History => {
                self.mode = Mode::Normal;
                if let Some(pair) = self.recent.get(self.history_selected).cloned() {
                    self.open_pair(Some(pair.a), Some(pair.b));
                }
            }
            _ => {}
        }
    }

    fn open_history(&mut self) {
        self.recent = match self.history.load() {
            Ok(pairs) => pairs,
            Err(e) => {
                tracing::warn!(error = %e, "history unavailable");
                Vec::new()
            }
        };
        self.history_selected = 0;
        self.mode = Mode::History;
    }

    fn record_history(&mut self) {
        let (Some(a), Some(b)) = (self.panes[0].path.clone(), self.panes[1].path.clone()) else {
            return;
        };
        let pair = RecentPair {
            a: absolute(&a),
            b: absolute(&b),
            opened_at: chrono::Utc::now().timestamp_millis(),
        };

        let existing = self.history.load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "treating unreadable history as empty");
            Vec::new()
        });
        if let Err(e) = self.history.store(&remember(existing, pair)) {
            tracing::warn!(error = %e, "could not save history");
        }
    }

    // --- editing ---------------------------------------------------------

    fn begin_edit(&mut self) {
        let side = self.focus;
        let line = self
            .layout
            .rows
            .row(side, self.cursor)
            .and_then(|record| Some((record.line_number?, record.text()?.to_string())));

        match line {
            Some((number, text)) => self.open_prompt(PromptKind::EditLine { side, index: number - 1 }, &text),
            None => self.message = Some(StatusMessage::info("Only file lines can be edited")),
        }
    }

    fn commit_edit(&mut self, side: Side, index: usize, text: &str) {
        let pane = &mut self.panes[side.index()];
        let Some(replaced) = pane.lines.as_ref().and_then(|l| l.with_line_replaced(index, text)) else {
            self.message = Some(StatusMessage::error("Line no longer exists"));
            return;
        };
        pane.lines = Some(replaced);
        pane.dirty = true;
        tracing::debug!(side = side.label(), line = index + 1, "edit committed");
        self.recompute();
    }

    /// Write the focused side verbatim and diff against what was written.
    fn save_focused(&mut self) {
        let side = self.focus;
        let pane = &self.panes[side.index()];
        let (Some(path), Some(lines)) = (pane.path.clone(), pane.lines.as_ref()) else {
            self.message = Some(StatusMessage::error(format!("Nothing to save on side {}", side.label())));
            return;
        };

        match self.files.save(&path, lines) {
            Ok(written) => {
                let count = written.len();
                let pane = &mut self.panes[side.index()];
                pane.lines = Some(written);
                pane.dirty = false;
                tracing::info!(path = %path.display(), lines = count, "saved file");
                self.message = Some(StatusMessage::info(format!("Wrote {} lines to {}", count, path.display())));
                self.recompute();
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "save failed");
                self.message = Some(StatusMessage::error(format!("{:#}", e)));
            }
        }
    }

    // --- settings --------------------------------------------------------

    fn cycle_theme(&mut self) {
        let next = theme::next_theme_name(&theme::current_name());
        if let Err(e) = theme::set_theme(next) {
            self.message = Some(StatusMessage::error(e.to_string()));
            return;
        }
        self.settings.theme = next.to_string();
        self.repaint();
        self.message = Some(StatusMessage::info(format!("Theme: {}", next)));
        self.persist_theme();
    }

    /// Write the current theme into the settings file. Everything else in the
    /// file stays as it was; option toggles and CLI flags last for the session.
    fn persist_theme(&mut self) {
        let Some(path) = &self.settings_path else {
            return;
        };
        let result = config::load_from(path).and_then(|mut on_disk| {
            on_disk.theme = self.settings.theme.clone();
            config::save_to(path, &on_disk)
        });
        if let Err(e) = result {
            tracing::warn!(path = %path.display(), error = %e, "could not persist theme");
            self.message = Some(StatusMessage::error(format!("Theme not saved: {}", e)));
        }
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{KeyEvent, LoadError};
    use pretty_assertions::assert_eq;
    use ratatui::backend::TestBackend;
    use ratatui::style::Style;
    use std::cell::RefCell;
    use std::collections::{HashMap, VecDeque};
    use std::io;
    use std::ops::Range;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct FakeFiles {
        files: Rc<RefCell<HashMap<PathBuf, String>>>,
    }

    impl FakeFiles {
        fn with(files: &[(&str, &str)]) -> Self {
            let fake = Self::default();
            for (path, text) in files {
                fake.files.borrow_mut().insert(PathBuf::from(path), text.to_string());
            }
            fake
        }

        fn text(&self, path: &str) -> Option<String> {
            self.files.borrow().get(Path::new(path)).cloned()
        }
    }

    impl FileStore for FakeFiles {
        fn load(&self, path: &Path) -> Result<LineSequence, LoadError> {
            match self.files.borrow().get(path) {
                Some(text) => Ok(LineSequence::from_text(text)),
                None => Err(LoadError::Io {
                    path: path.to_path_buf(),
                    source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
                }),
            }
        }

        fn save(&self, path: &Path, lines: &LineSequence) -> Result<LineSequence> {
            let text = lines.to_text();
            self.files.borrow_mut().insert(path.to_path_buf(), text.clone());
            Ok(LineSequence::from_text(&text))
        }
    }

    #[derive(Clone, Default)]
    struct FakeHistory {
        pairs: Rc<RefCell<Vec<RecentPair>>>,
    }

    impl HistoryStore for FakeHistory {
        fn load(&self) -> Result<Vec<RecentPair>> {
            Ok(self.pairs.borrow().clone())
        }

        fn store(&self, pairs: &[RecentPair]) -> Result<()> {
            *self.pairs.borrow_mut() = pairs.to_vec();
            Ok(())
        }
    }

    struct PlainHighlighter;

    impl Highlighter for PlainHighlighter {
        fn lexer_for(&self, _name_hint: Option<&str>, _sample: &str) -> LexerHandle {
            LexerHandle::plain()
        }

        fn highlight(&self, _lexer: &LexerHandle, _line: &str) -> Vec<(Range<usize>, Style)> {
            Vec::new()
        }
    }

    struct FakeTerminal {
        inner: ratatui::Terminal<TestBackend>,
        events: RefCell<VecDeque<TerminalEvent>>,
    }

    impl FakeTerminal {
        fn new(events: Vec<TerminalEvent>) -> Self {
            Self {
                inner: ratatui::Terminal::new(TestBackend::new(80, 24)).unwrap(),
                events: RefCell::new(events.into()),
            }
        }
    }

    impl Terminal for FakeTerminal {
        fn draw<F>(&mut self, f: F) -> Result<()>
        where
            F: FnOnce(&mut Frame),
        {
            self.inner.draw(f)?;
            Ok(())
        }

        fn poll_event(&self, _timeout: Duration) -> Result<Option<TerminalEvent>> {
            // Quit once the script runs out
            Ok(Some(self.events.borrow_mut().pop_front().unwrap_or(TerminalEvent::Key(KeyEvent {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers::CTRL,
            }))))
        }
    }

    fn app_with(files: &FakeFiles, history: &FakeHistory) -> App {
        App::new(
            Box::new(files.clone()),
            Box::new(history.clone()),
            Box::new(PlainHighlighter),
            Settings::default(),
            None,
        )
    }

    fn open(files: &[(&str, &str)]) -> (App, FakeFiles, FakeHistory) {
        let files = FakeFiles::with(files);
        let history = FakeHistory::default();
        let mut app = app_with(&files, &history);
        app.open_pair(Some(PathBuf::from("a.txt")), Some(PathBuf::from("b.txt")));
        (app, files, history)
    }

    fn press(app: &mut App, c: char) {
        app.handle_key(KeyCode::Char(c), KeyModifiers::NONE);
    }

    fn press_key(app: &mut App, code: KeyCode) {
        app.handle_key(code, KeyModifiers::NONE);
    }

    fn type_text(app: &mut App, text: &str) {
        text.chars().for_each(|c| press(app, c));
    }

    fn numbered(count: usize) -> String {
        (1..=count).map(|i| format!("line {}\n", i)).collect()
    }

    #[test]
    fn test_open_pair_builds_layout_and_records_history() {
        let (app, _, history) = open(&[("a.txt", "a\nb\nc\n"), ("b.txt", "a\nx\nc\n")]);

        assert_eq!(app.layout.rows.len(), 3);
        assert_eq!(app.layout.stats.changed, 1);
        assert_eq!(app.message, None);

        let pairs = history.pairs.borrow();
        assert_eq!(pairs.len(), 1);
        assert!(pairs[0].a.ends_with("a.txt"));
        assert!(pairs[0].b.ends_with("b.txt"));
    }

    #[test]
    fn test_failed_side_keeps_other_side() {
        let (app, _, history) = open(&[("a.txt", "one\ntwo\n")]);

        assert_eq!(app.layout.rows.len(), 2);
        assert_eq!(app.layout.rows.row(Side::A, 1).and_then(|r| r.line_number), Some(2));
        assert!(app.layout.rows.row(Side::B, 0).is_some_and(|r| r.placeholder));
        assert_eq!(app.message.as_ref().map(|m| m.level), Some(MessageLevel::Error));
        assert!(history.pairs.borrow().is_empty());
    }

    #[test]
    fn test_next_and_prev_diff_wrap() {
        let (mut app, _, _) = open(&[
            ("a.txt", "1\n2\n3\n4\n5\n6\n"),
            ("b.txt", "1\nX\n3\n4\nY\n6\n"),
        ]);

        press(&mut app, 'n');
        assert_eq!(app.cursor, 1);
        press(&mut app, 'n');
        assert_eq!(app.cursor, 4);
        press(&mut app, 'n');
        assert_eq!(app.cursor, 1);
        press(&mut app, 'N');
        assert_eq!(app.cursor, 4);
    }

    #[test]
    fn test_goto_line_found_and_missing() {
        let (mut app, _, _) = open(&[("a.txt", numbered(30).as_str()), ("b.txt", numbered(30).as_str())]);

        press(&mut app, ':');
        type_text(&mut app, "12");
        press_key(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.cursor, 11);

        press(&mut app, ':');
        type_text(&mut app, "99");
        press_key(&mut app, KeyCode::Enter);
        assert_eq!(app.cursor, 11);
        assert_eq!(app.message.as_ref().map(|m| m.level), Some(MessageLevel::Info));
    }

    #[test]
    fn test_goto_folded_line_is_reported() {
        let (mut app, _, _) = open(&[("a.txt", numbered(20).as_str()), ("b.txt", numbered(20).as_str())]);
        press(&mut app, 'z');
        assert_eq!(app.layout.rows.len(), 3);

        press(&mut app, ':');
        type_text(&mut app, "10");
        press_key(&mut app, KeyCode::Enter);
        assert_eq!(app.cursor, 0);
        assert!(app.message.as_ref().is_some_and(|m| m.text.contains("not shown")));
    }

    #[test]
    fn test_prompt_receives_letters() {
        let (mut app, _, _) = open(&[("a.txt", "a\n"), ("b.txt", "a\n")]);

        press(&mut app, ':');
        type_text(&mut app, "qj");
        assert!(!app.should_quit);
        assert_eq!(app.input.text(), "qj");

        press_key(&mut app, KeyCode::Esc);
        assert_eq!(app.mode, Mode::Normal);
        press(&mut app, 'q');
        assert!(app.should_quit);
    }

    #[test]
    fn test_edit_then_save_round_trip() {
        let (mut app, files, _) = open(&[("a.txt", "a\r\nb\r\nc\r\n"), ("b.txt", "a\r\ny\r\nc\r\n")]);
        assert_eq!(app.layout.stats.changed, 1);

        press(&mut app, 'j');
        press(&mut app, 'e');
        assert_eq!(app.mode, Mode::Prompt(PromptKind::EditLine { side: Side::A, index: 1 }));
        assert_eq!(app.input.text(), "b");

        press_key(&mut app, KeyCode::Backspace);
        press(&mut app, 'y');
        press_key(&mut app, KeyCode::Enter);

        assert!(app.layout.stats.is_identical());
        assert!(app.panes[0].dirty);
        assert_eq!(files.text("a.txt").as_deref(), Some("a\r\nb\r\nc\r\n"));

        press(&mut app, 'w');
        assert_eq!(files.text("a.txt").as_deref(), Some("a\r\ny\r\nc\r\n"));
        assert!(!app.panes[0].dirty);
        assert!(app.layout.stats.is_identical());
    }

    #[test]
    fn test_placeholder_rows_are_not_editable() {
        let (mut app, _, _) = open(&[("a.txt", ""), ("b.txt", "hello\n")]);

        press(&mut app, 'e');
        assert_eq!(app.mode, Mode::Normal);
        assert!(app.message.is_some());
    }

    #[test]
    fn test_toggle_ignore_case_rediffs() {
        let (mut app, _, _) = open(&[("a.txt", "Hello\n"), ("b.txt", "hello\n")]);
        assert_eq!(app.layout.stats.changed, 1);

        press(&mut app, 'i');
        assert!(app.layout.stats.is_identical());
        assert_eq!(app.layout.rows.row(Side::A, 0).and_then(|r| r.text()), Some("Hello"));
        assert_eq!(app.layout.rows.row(Side::B, 0).and_then(|r| r.text()), Some("hello"));
    }

    #[test]
    fn test_theme_persists_without_session_toggles() {
        let dir = std::env::temp_dir().join(format!("test_app_theme_{}", uuid::Uuid::new_v4()));
        let path = dir.join("config.toml");
        let on_disk = Settings {
            tab_width: 8,
            ..Default::default()
        };
        config::save_to(&path, &on_disk).unwrap();

        let files = FakeFiles::with(&[("a.txt", "Hello\n"), ("b.txt", "hello\n")]);
        let history = FakeHistory::default();
        let mut session = on_disk.clone();
        session.diff.ignore_whitespace = true;
        let mut app = App::new(
            Box::new(files.clone()),
            Box::new(history.clone()),
            Box::new(PlainHighlighter),
            session,
            Some(path.clone()),
        );
        app.open_pair(Some(PathBuf::from("a.txt")), Some(PathBuf::from("b.txt")));

        press(&mut app, 'i');
        press(&mut app, 'z');
        assert!(app.settings.diff.ignore_case);
        assert!(app.settings.fold.enabled);

        app.settings.theme = "github-light".to_string();
        app.persist_theme();

        let saved = config::load_from(&path).unwrap();
        assert_eq!(saved.theme, "github-light");
        assert_eq!(saved.tab_width, 8);
        assert!(!saved.diff.ignore_case);
        assert!(!saved.diff.ignore_whitespace);
        assert!(!saved.fold.enabled);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_reload_picks_up_disk_changes() {
        let (mut app, files, _) = open(&[("a.txt", "a\n"), ("b.txt", "a\n")]);
        files.files.borrow_mut().insert(PathBuf::from("b.txt"), "a\nb\n".to_string());

        press(&mut app, 'r');
        assert_eq!(app.layout.stats.added, 1);
        assert_eq!(app.message, Some(StatusMessage::info("Reloaded")));
    }

    #[test]
    fn test_search_jumps_to_match() {
        let (mut app, _, _) = open(&[
            ("a.txt", "alpha\nbeta\ngamma\n"),
            ("b.txt", "alpha\nbeta\ngamma\nzebra crossing\n"),
        ]);

        press(&mut app, '/');
        type_text(&mut app, "zebra");
        assert_eq!(app.mode, Mode::Search);
        press_key(&mut app, KeyCode::Enter);

        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.focus, Side::B);
        assert_eq!(app.cursor, 3);
    }

    #[test]
    fn test_history_picker_reopens_pair() {
        let files = FakeFiles::with(&[("a.txt", "1\n"), ("b.txt", "2\n")]);
        let history = FakeHistory::default();
        history.pairs.borrow_mut().push(RecentPair {
            a: PathBuf::from("a.txt"),
            b: PathBuf::from("b.txt"),
            opened_at: 0,
        });
        let mut app = app_with(&files, &history);
        app.open_pair(None, None);
        assert!(app.message.is_some());

        press(&mut app, 'o');
        assert_eq!(app.mode, Mode::History);
        press_key(&mut app, KeyCode::Enter);

        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.layout.stats.changed, 1);
    }

    #[test]
    fn test_help_closes_on_any_key() {
        let (mut app, _, _) = open(&[("a.txt", "a\n"), ("b.txt", "a\n")]);
        press(&mut app, '?');
        assert_eq!(app.mode, Mode::Help);
        press(&mut app, 'x');
        assert_eq!(app.mode, Mode::Normal);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_run_loop_syncs_wheel_scroll_across_surfaces() {
        let (mut app, _, _) = open(&[("a.txt", numbered(100).as_str()), ("b.txt", numbered(100).as_str())]);
        let wheel = TerminalEvent::Mouse(MouseEvent {
            kind: MouseKind::ScrollDown,
            column: 10,
            row: 5,
        });
        let mut terminal = FakeTerminal::new(vec![wheel]);

        app.run(&mut terminal).unwrap();

        assert!(app.should_quit);
        assert!(app.sync.is_idle());
        let offsets: Vec<usize> = Surface::ALL.iter().map(|s| app.sync.offset(*s)).collect();
        assert_eq!(offsets, vec![3, 3, 3, 3]);
    }

    #[test]
    fn test_render_shows_both_paths() {
        let (mut app, _, _) = open(&[("a.txt", "left\n"), ("b.txt", "right\n")]);
        let mut terminal = ratatui::Terminal::new(TestBackend::new(80, 12)).unwrap();
        terminal.draw(|frame| {
            app.render(frame);
        })
        .unwrap();

        let buffer = terminal.backend().buffer();
        let screen: String = (0..buffer.area.height)
            .map(|y| (0..buffer.area.width).map(|x| buffer[(x, y)].symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n");
        assert!(screen.contains("a.txt"));
        assert!(screen.contains("b.txt"));
        assert!(screen.contains("left"));
        assert!(screen.contains("right"));
    }

    #[test]
    fn test_input_line_editing() {
        let mut input = InputLine::new("héllo");
        assert_eq!(input.cursor(), 5);
        input.home();
        input.right();
        input.delete();
        assert_eq!(input.text(), "hllo");
        input.insert('e');
        input.end();
        input.backspace();
        assert_eq!(input.text(), "hell");
        input.left();
        input.left();
        input.left();
        input.left();
        input.left();
        assert_eq!(input.cursor(), 0);
    }
}
