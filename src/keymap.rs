//! Context-based keymap.
//!
//! Bindings are matched against a context stack, with more specific contexts winning.
//! Example: Prompt > Global. Plain letters are bound in DiffView rather than Global
//! so that prompts receive them as text.

use crate::ports::{KeyCode, KeyModifiers};

/// Contexts that can be active. Forms a specificity hierarchy.
/// More specific contexts (higher discriminant) take precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    /// Always active - lowest precedence
    Global = 0,
    /// The two panes have focus
    DiffView = 1,
    /// Single-line prompt (go to line, edit line)
    Prompt = 2,
    /// Fuzzy search overlay is shown
    Search = 3,
    /// Recent pairs picker is shown
    History = 4,
    /// Help overlay is shown
    Help = 5,
}

impl Context {
    /// Specificity for precedence ordering. Higher = more specific.
    pub fn specificity(self) -> u8 {
        self as u8
    }

    /// True for contexts where unbound characters are typed into a buffer.
    pub fn accepts_text(self) -> bool {
        matches!(self, Context::Prompt | Context::Search)
    }
}

/// Categories for grouping keybindings in help display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HelpCategory {
    Navigation = 0,
    Editing = 1,
    View = 2,
    General = 3,
}

impl HelpCategory {
    pub fn display_name(self) -> &'static str {
        match self {
            HelpCategory::Navigation => "Navigation",
            HelpCategory::Editing => "Files & Editing",
            HelpCategory::View => "Comparison",
            HelpCategory::General => "General",
        }
    }
}

/// Actions that can be triggered by key bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    // Navigation
    MoveDown,
    MoveUp,
    HalfPageDown,
    HalfPageUp,
    PageDown,
    PageUp,
    GotoTop,
    GotoBottom,
    ScrollLeft,
    ScrollRight,
    NextDiff,
    PrevDiff,
    GotoLine,
    SwitchSide,

    // Files and editing
    EditLine,
    Save,
    Reload,
    OpenHistory,

    // Comparison options
    ToggleFold,
    ToggleIgnoreCase,
    ToggleIgnoreWhitespace,
    ToggleNormalizeEol,
    CycleTheme,

    // General
    OpenSearch,
    ShowHelp,
    DismissHelp,
    Quit,

    // Text input
    SubmitInput,
    CancelInput,
    InputBackspace,
    InputDelete,
    InputLeft,
    InputRight,
    InputHome,
    InputEnd,

    // Overlays
    SelectNext,
    SelectPrev,
    ConfirmSelection,
    CloseOverlay,
}

/// A single key binding with optional context requirement.
#[derive(Debug, Clone)]
pub struct KeyBinding {
    pub key: KeyCode,
    pub modifiers: KeyModifiers,
    /// If Some, binding only active in this context. None = Global.
    pub context: Option<Context>,
    pub action: Action,
    /// Description for help display. If None, binding is hidden from help.
    pub help_text: Option<&'static str>,
    pub category: Option<HelpCategory>,
}

impl KeyBinding {
    pub fn new(key: KeyCode, action: Action) -> Self {
        Self {
            key,
            modifiers: KeyModifiers::NONE,
            context: None,
            action,
            help_text: None,
            category: None,
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.modifiers.ctrl = true;
        self
    }

    pub fn in_context(mut self, ctx: Context) -> Self {
        self.context = Some(ctx);
        self
    }

    pub fn help(mut self, category: HelpCategory, text: &'static str) -> Self {
        self.category = Some(category);
        self.help_text = Some(text);
        self
    }
}

/// The keymap holds all bindings and dispatches key events.
pub struct Keymap {
    bindings: Vec<KeyBinding>,
}

impl Keymap {
    pub fn new() -> Self {
        Self { bindings: Vec::new() }
    }

    /// Add a binding. Later bindings take precedence at same specificity.
    pub fn bind(&mut self, binding: KeyBinding) {
        self.bindings.push(binding);
    }

    /// Look up the action for a key event given active contexts.
    pub fn lookup(
        &self,
        key: KeyCode,
        modifiers: KeyModifiers,
        active_contexts: &[Context],
    ) -> Option<Action> {
        let mut best_match: Option<(u8, Action)> = None;

        // Reverse so later bindings win at same specificity
        for binding in self.bindings.iter().rev() {
            if binding.key != key || binding.modifiers.ctrl != modifiers.ctrl {
                continue;
            }

            let specificity = match binding.context {
                None => 0,
                Some(ctx) if active_contexts.contains(&ctx) => ctx.specificity(),
                Some(_) => continue,
            };

            match best_match {
                Some((best_spec, _)) if specificity <= best_spec => {}
                _ => best_match = Some((specificity, binding.action)),
            }
        }

        best_match.map(|(_, action)| action)
    }

    /// Help entries grouped by category, first binding per key wins.
    pub fn help_entries(&self) -> Vec<(HelpCategory, Vec<HelpEntry>)> {
        use std::collections::{BTreeMap, HashSet};

        let mut by_category: BTreeMap<HelpCategory, Vec<HelpEntry>> = BTreeMap::new();
        let mut seen_keys: HashSet<String> = HashSet::new();

        for binding in &self.bindings {
            let (Some(category), Some(text)) = (binding.category, binding.help_text) else {
                continue;
            };
            let key_display = format_key_display(&binding.key, &binding.modifiers);
            if !seen_keys.insert(key_display.clone()) {
                continue;
            }
            by_category.entry(category).or_default().push(HelpEntry {
                key_display,
                description: text,
            });
        }

        by_category.into_iter().collect()
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new()
    }
}

/// Entry for help display.
#[derive(Debug, Clone)]
pub struct HelpEntry {
    pub key_display: String,
    pub description: &'static str,
}

fn format_key_display(key: &KeyCode, modifiers: &KeyModifiers) -> String {
    let key_str = match key {
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::BackTab => "S-Tab".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Delete => "Del".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Up => "↑".to_string(),
        KeyCode::Down => "↓".to_string(),
        KeyCode::Left => "←".to_string(),
        KeyCode::Right => "→".to_string(),
        KeyCode::PageUp => "PgUp".to_string(),
        KeyCode::PageDown => "PgDn".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
    };

    if modifiers.ctrl {
        format!("Ctrl+{}", key_str)
    } else {
        key_str
    }
}

/// Build the default keymap with all bindings.
pub fn build_default_keymap() -> Keymap {
    use Context::*;
    use HelpCategory::*;

    let mut km = Keymap::new();

    let key = |k: KeyCode, a: Action| KeyBinding::new(k, a);
    let ch = |c: char, a: Action| KeyBinding::new(KeyCode::Char(c), a);

    // === Navigation (shown in help) ===
    km.bind(ch('j', Action::MoveDown).in_context(DiffView).help(Navigation, "Move down"));
    km.bind(ch('k', Action::MoveUp).in_context(DiffView).help(Navigation, "Move up"));
    km.bind(ch('d', Action::HalfPageDown).with_ctrl().in_context(DiffView).help(Navigation, "Half page down"));
    km.bind(ch('u', Action::HalfPageUp).with_ctrl().in_context(DiffView).help(Navigation, "Half page up"));
    km.bind(ch('g', Action::GotoTop).in_context(DiffView).help(Navigation, "Go to top"));
    km.bind(ch('G', Action::GotoBottom).in_context(DiffView).help(Navigation, "Go to bottom"));
    km.bind(ch('h', Action::ScrollLeft).in_context(DiffView).help(Navigation, "Scroll focused pane left"));
    km.bind(ch('l', Action::ScrollRight).in_context(DiffView).help(Navigation, "Scroll focused pane right"));
    km.bind(ch('n', Action::NextDiff).in_context(DiffView).help(Navigation, "Next difference"));
    km.bind(ch('N', Action::PrevDiff).in_context(DiffView).help(Navigation, "Previous difference"));
    km.bind(ch(':', Action::GotoLine).in_context(DiffView).help(Navigation, "Go to line"));
    km.bind(key(KeyCode::Tab, Action::SwitchSide).in_context(DiffView).help(Navigation, "Switch focused pane"));

    // === Files & editing ===
    km.bind(ch('e', Action::EditLine).in_context(DiffView).help(Editing, "Edit line under cursor"));
    km.bind(ch('w', Action::Save).in_context(DiffView).help(Editing, "Save focused file"));
    km.bind(ch('r', Action::Reload).in_context(DiffView).help(Editing, "Reload both files"));
    km.bind(ch('o', Action::OpenHistory).in_context(DiffView).help(Editing, "Recent comparisons"));

    // === Comparison options ===
    km.bind(ch('z', Action::ToggleFold).in_context(DiffView).help(View, "Fold unchanged runs"));
    km.bind(ch('i', Action::ToggleIgnoreCase).in_context(DiffView).help(View, "Ignore case"));
    km.bind(ch('s', Action::ToggleIgnoreWhitespace).in_context(DiffView).help(View, "Ignore surrounding whitespace"));
    km.bind(ch('E', Action::ToggleNormalizeEol).in_context(DiffView).help(View, "Normalize line endings"));
    km.bind(ch('t', Action::CycleTheme).in_context(DiffView).help(View, "Next theme"));

    // === General ===
    km.bind(ch('/', Action::OpenSearch).in_context(DiffView).help(General, "Search lines"));
    km.bind(ch('?', Action::ShowHelp).in_context(DiffView).help(General, "Toggle help"));
    km.bind(ch('q', Action::Quit).in_context(DiffView).help(General, "Quit"));

    // === Secondary bindings (hidden from help) ===
    km.bind(ch('c', Action::Quit).with_ctrl());
    km.bind(key(KeyCode::Down, Action::MoveDown).in_context(DiffView));
    km.bind(key(KeyCode::Up, Action::MoveUp).in_context(DiffView));
    km.bind(key(KeyCode::Left, Action::ScrollLeft).in_context(DiffView));
    km.bind(key(KeyCode::Right, Action::ScrollRight).in_context(DiffView));
    km.bind(key(KeyCode::PageDown, Action::PageDown).in_context(DiffView));
    km.bind(key(KeyCode::PageUp, Action::PageUp).in_context(DiffView));
    km.bind(key(KeyCode::Home, Action::GotoTop).in_context(DiffView));
    km.bind(key(KeyCode::End, Action::GotoBottom).in_context(DiffView));
    km.bind(ch(']', Action::NextDiff).in_context(DiffView));
    km.bind(ch('[', Action::PrevDiff).in_context(DiffView));
    km.bind(key(KeyCode::BackTab, Action::SwitchSide).in_context(DiffView));

    // === Prompt ===
    km.bind(key(KeyCode::Enter, Action::SubmitInput).in_context(Prompt));
    km.bind(key(KeyCode::Esc, Action::CancelInput).in_context(Prompt));
    km.bind(key(KeyCode::Backspace, Action::InputBackspace).in_context(Prompt));
    km.bind(key(KeyCode::Delete, Action::InputDelete).in_context(Prompt));
    km.bind(key(KeyCode::Left, Action::InputLeft).in_context(Prompt));
    km.bind(key(KeyCode::Right, Action::InputRight).in_context(Prompt));
    km.bind(key(KeyCode::Home, Action::InputHome).in_context(Prompt));
    km.bind(key(KeyCode::End, Action::InputEnd).in_context(Prompt));
    km.bind(ch('a', Action::InputHome).with_ctrl().in_context(Prompt));
    km.bind(ch('e', Action::InputEnd).with_ctrl().in_context(Prompt));

    // === Search ===
    km.bind(key(KeyCode::Enter, Action::ConfirmSelection).in_context(Search));
    km.bind(key(KeyCode::Esc, Action::CloseOverlay).in_context(Search));
    km.bind(key(KeyCode::Backspace, Action::InputBackspace).in_context(Search));
    km.bind(key(KeyCode::Down, Action::SelectNext).in_context(Search));
    km.bind(key(KeyCode::Up, Action::SelectPrev).in_context(Search));
    km.bind(ch('n', Action::SelectNext).with_ctrl().in_context(Search));
    km.bind(ch('p', Action::SelectPrev).with_ctrl().in_context(Search));

    // === History picker ===
    km.bind(key(KeyCode::Enter, Action::ConfirmSelection).in_context(History));
    km.bind(key(KeyCode::Esc, Action::CloseOverlay).in_context(History));
    km.bind(ch('q', Action::CloseOverlay).in_context(History));
    km.bind(ch('j', Action::SelectNext).in_context(History));
    km.bind(ch('k', Action::SelectPrev).in_context(History));
    km.bind(key(KeyCode::Down, Action::SelectNext).in_context(History));
    km.bind(key(KeyCode::Up, Action::SelectPrev).in_context(History));

    // === Help ===
    km.bind(key(KeyCode::Esc, Action::DismissHelp).in_context(Help));
    km.bind(ch('?', Action::DismissHelp).in_context(Help));
    km.bind(ch('q', Action::DismissHelp).in_context(Help));
    km.bind(key(KeyCode::Enter, Action::DismissHelp).in_context(Help));

    km
}
