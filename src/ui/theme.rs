//! Theme registry and active theme state.

use std::str::FromStr;
use std::sync::RwLock;

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use ratatui::style::Color;
use syntect::highlighting::{
    Color as SynColor, FontStyle, ScopeSelectors, StyleModifier, Theme, ThemeItem, ThemeSettings,
};

#[derive(Debug, Clone, Copy)]
pub struct UiTheme {
    pub bg_default: Color,
    pub bg_header: Color,
    pub bg_status: Color,
    pub bg_added_line: Color,
    pub bg_deleted_line: Color,
    pub bg_changed_line: Color,
    pub bg_added_span: Color,
    pub bg_deleted_span: Color,
    pub bg_placeholder: Color,
    pub bg_folded: Color,
    pub bg_cursor: Color,
    pub bg_overlay: Color,
    pub fg_default: Color,
    pub fg_muted: Color,
    pub fg_added: Color,
    pub fg_deleted: Color,
    pub fg_changed: Color,
    pub fg_gutter: Color,
    pub fg_gutter_changed: Color,
    pub fg_path: Color,
    pub fg_border: Color,
    pub fg_border_focused: Color,
    pub fg_warning: Color,
    pub fg_error: Color,
}

#[derive(Debug, Clone, Copy)]
pub struct SyntaxPalette {
    pub fg: SynColor,
    pub background: SynColor,
    pub comment: SynColor,
    pub keyword: SynColor,
    pub string: SynColor,
    pub constant: SynColor,
    pub entity: SynColor,
    pub tag: SynColor,
    pub variable: SynColor,
}

#[derive(Clone, Copy)]
pub struct ThemeSpec {
    pub name: &'static str,
    pub ui: UiTheme,
    pub syntax: SyntaxPalette,
}

struct ThemeState {
    name: String,
    ui: UiTheme,
    syntect_theme: Theme,
}

pub const DEFAULT_THEME: &str = "monokai";

static THEME_STATE: Lazy<RwLock<ThemeState>> = Lazy::new(|| {
    let spec = monokai();
    RwLock::new(ThemeState {
        name: spec.name.to_string(),
        ui: spec.ui,
        syntect_theme: build_syntect_theme(&spec.syntax, spec.name),
    })
});

const THEME_ORDER: &[&str] = &["monokai", "github-dark", "github-light"];

pub fn available_themes() -> Vec<String> {
    THEME_ORDER.iter().map(|name| (*name).to_string()).collect()
}

pub fn current_name() -> String {
    match THEME_STATE.read() {
        Ok(guard) => guard.name.clone(),
        Err(poisoned) => poisoned.into_inner().name.clone(),
    }
}

pub fn current_ui() -> UiTheme {
    match THEME_STATE.read() {
        Ok(guard) => guard.ui,
        Err(poisoned) => poisoned.into_inner().ui,
    }
}

pub fn with_syntax_theme<R>(f: impl FnOnce(&Theme) -> R) -> R {
    match THEME_STATE.read() {
        Ok(guard) => f(&guard.syntect_theme),
        Err(poisoned) => f(&poisoned.into_inner().syntect_theme),
    }
}

pub fn set_theme(name: &str) -> Result<()> {
    let Some(spec) = find_theme(name) else {
        bail!(
            "Unknown theme '{}'. Available: {}",
            name,
            available_themes().join(", ")
        );
    };

    let syntect_theme = build_syntect_theme(&spec.syntax, spec.name);
    let mut guard = match THEME_STATE.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    guard.name = spec.name.to_string();
    guard.ui = spec.ui;
    guard.syntect_theme = syntect_theme;
    tracing::debug!(theme = spec.name, "theme set");
    Ok(())
}

/// The theme after `current` in display order, wrapping around.
pub fn next_theme_name(current: &str) -> &'static str {
    let current = normalize(current);
    let pos = THEME_ORDER.iter().position(|n| *n == current).unwrap_or(0);
    THEME_ORDER[(pos + 1) % THEME_ORDER.len()]
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase().replace('_', "-")
}

fn find_theme(name: &str) -> Option<ThemeSpec> {
    match normalize(name).as_str() {
        "monokai" | "default" => Some(monokai()),
        "github-dark" | "dark" | "gh-dark" => Some(github_dark()),
        "github-light" | "light" | "gh-light" => Some(github_light()),
        _ => None,
    }
}

fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb(r, g, b)
}

fn syn(r: u8, g: u8, b: u8) -> SynColor {
    SynColor { r, g, b, a: 255 }
}

// ─── Monokai ─────────────────────────────────────────────────────────────────

fn monokai() -> ThemeSpec {
    ThemeSpec {
        name: "monokai",
        ui: UiTheme {
            bg_default: rgb(39, 40, 34),
            bg_header: rgb(49, 50, 43),
            bg_status: rgb(62, 61, 50),
            bg_added_line: rgb(42, 58, 34),
            bg_deleted_line: rgb(66, 36, 40),
            bg_changed_line: rgb(58, 54, 30),
            bg_added_span: rgb(72, 102, 44),
            bg_deleted_span: rgb(118, 46, 56),
            bg_placeholder: rgb(33, 34, 29),
            bg_folded: rgb(49, 50, 43),
            bg_cursor: rgb(73, 72, 62),
            bg_overlay: rgb(49, 50, 43),
            fg_default: rgb(248, 248, 242),
            fg_muted: rgb(117, 113, 94),
            fg_added: rgb(166, 226, 46),
            fg_deleted: rgb(249, 38, 114),
            fg_changed: rgb(230, 219, 116),
            fg_gutter: rgb(117, 113, 94),
            fg_gutter_changed: rgb(230, 219, 116),
            fg_path: rgb(102, 217, 239),
            fg_border: rgb(73, 72, 62),
            fg_border_focused: rgb(102, 217, 239),
            fg_warning: rgb(253, 151, 31),
            fg_error: rgb(249, 38, 114),
        },
        syntax: SyntaxPalette {
            fg: syn(248, 248, 242),
            background: syn(39, 40, 34),
            comment: syn(117, 113, 94),
            keyword: syn(249, 38, 114),
            string: syn(230, 219, 116),
            constant: syn(174, 129, 255),
            entity: syn(166, 226, 46),
            tag: syn(249, 38, 114),
            variable: syn(253, 151, 31),
        },
    }
}

// ─── GitHub ──────────────────────────────────────────────────────────────────

fn github_dark() -> ThemeSpec {
    ThemeSpec {
        name: "github-dark",
        ui: UiTheme {
            bg_default: rgb(36, 41, 46),
            bg_header: rgb(31, 36, 40),
            bg_status: rgb(47, 54, 61),
            bg_added_line: rgb(24, 39, 33),
            bg_deleted_line: rgb(36, 24, 29),
            bg_changed_line: rgb(45, 42, 26),
            bg_added_span: rgb(50, 82, 56),
            bg_deleted_span: rgb(99, 51, 50),
            bg_placeholder: rgb(31, 36, 40),
            bg_folded: rgb(36, 41, 56),
            bg_cursor: rgb(57, 65, 74),
            bg_overlay: rgb(31, 36, 40),
            fg_default: rgb(225, 228, 232),
            fg_muted: rgb(149, 157, 165),
            fg_added: rgb(52, 208, 88),
            fg_deleted: rgb(234, 74, 90),
            fg_changed: rgb(255, 223, 93),
            fg_gutter: rgb(106, 115, 125),
            fg_gutter_changed: rgb(225, 228, 232),
            fg_path: rgb(121, 184, 255),
            fg_border: rgb(68, 77, 86),
            fg_border_focused: rgb(121, 184, 255),
            fg_warning: rgb(255, 171, 112),
            fg_error: rgb(234, 74, 90),
        },
        syntax: SyntaxPalette {
            fg: syn(225, 228, 232),
            background: syn(36, 41, 46),
            comment: syn(106, 115, 125),
            keyword: syn(249, 117, 131),
            string: syn(158, 203, 255),
            constant: syn(121, 184, 255),
            entity: syn(179, 146, 240),
            tag: syn(133, 232, 157),
            variable: syn(255, 171, 112),
        },
    }
}

fn github_light() -> ThemeSpec {
    ThemeSpec {
        name: "github-light",
        ui: UiTheme {
            bg_default: rgb(255, 255, 255),
            bg_header: rgb(246, 248, 250),
            bg_status: rgb(234, 238, 242),
            bg_added_line: rgb(230, 255, 237),
            bg_deleted_line: rgb(255, 238, 240),
            bg_changed_line: rgb(255, 248, 197),
            bg_added_span: rgb(172, 242, 189),
            bg_deleted_span: rgb(253, 184, 192),
            bg_placeholder: rgb(246, 248, 250),
            bg_folded: rgb(221, 244, 255),
            bg_cursor: rgb(234, 238, 242),
            bg_overlay: rgb(246, 248, 250),
            fg_default: rgb(36, 41, 47),
            fg_muted: rgb(87, 96, 106),
            fg_added: rgb(26, 127, 55),
            fg_deleted: rgb(207, 34, 46),
            fg_changed: rgb(154, 103, 0),
            fg_gutter: rgb(110, 119, 129),
            fg_gutter_changed: rgb(36, 41, 47),
            fg_path: rgb(9, 105, 218),
            fg_border: rgb(208, 215, 222),
            fg_border_focused: rgb(9, 105, 218),
            fg_warning: rgb(154, 103, 0),
            fg_error: rgb(207, 34, 46),
        },
        syntax: SyntaxPalette {
            fg: syn(36, 41, 47),
            background: syn(255, 255, 255),
            comment: syn(110, 119, 129),
            keyword: syn(207, 34, 46),
            string: syn(10, 48, 105),
            constant: syn(5, 80, 174),
            entity: syn(130, 80, 223),
            tag: syn(17, 99, 41),
            variable: syn(149, 56, 0),
        },
    }
}

fn build_syntect_theme(palette: &SyntaxPalette, name: &str) -> Theme {
    Theme {
        name: Some(name.to_string()),
        settings: ThemeSettings {
            foreground: Some(palette.fg),
            background: Some(palette.background),
            ..Default::default()
        },
        scopes: vec![
            theme_item("comment", palette.comment, false, true),
            theme_item("punctuation.definition.comment", palette.comment, false, true),
            theme_item("keyword", palette.keyword, false, false),
            theme_item("keyword.control", palette.keyword, false, false),
            theme_item("storage", palette.keyword, false, false),
            theme_item("storage.type", palette.keyword, false, false),
            theme_item("storage.modifier", palette.keyword, false, false),
            theme_item("string", palette.string, false, false),
            theme_item("punctuation.definition.string", palette.string, false, false),
            theme_item("constant", palette.constant, false, false),
            theme_item("constant.numeric", palette.constant, false, false),
            theme_item("constant.language", palette.constant, false, false),
            theme_item("entity.name.function", palette.entity, false, false),
            theme_item("support.function", palette.entity, false, false),
            theme_item("entity.name.type", palette.entity, false, false),
            theme_item("entity.name.class", palette.entity, false, false),
            theme_item("support.type", palette.constant, false, false),
            theme_item("entity.name.tag", palette.tag, false, false),
            theme_item("variable", palette.variable, false, false),
            theme_item("variable.parameter", palette.fg, false, false),
            theme_item("variable.other", palette.fg, false, false),
            theme_item("punctuation", palette.fg, false, false),
            theme_item("keyword.operator", palette.fg, false, false),
        ],
        ..Default::default()
    }
}

fn theme_item(scope: &str, color: SynColor, bold: bool, italic: bool) -> ThemeItem {
    let mut font_style = FontStyle::empty();
    if bold {
        font_style |= FontStyle::BOLD;
    }
    if italic {
        font_style |= FontStyle::ITALIC;
    }
    ThemeItem {
        scope: ScopeSelectors::from_str(scope).unwrap_or_default(),
        style: StyleModifier {
            foreground: Some(color),
            font_style: Some(font_style),
            ..Default::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_themes() {
        let names = available_themes();
        assert_eq!(names[0], DEFAULT_THEME);
        assert!(names.contains(&"github-light".to_string()));
    }

    #[test]
    fn test_aliases_resolve() {
        assert_eq!(find_theme("GitHub_Dark").map(|t| t.name), Some("github-dark"));
        assert_eq!(find_theme(" light ").map(|t| t.name), Some("github-light"));
        assert!(find_theme("solarized").is_none());
    }

    #[test]
    fn test_unknown_theme_is_rejected() {
        let err = set_theme("nope").unwrap_err();
        assert!(err.to_string().contains("Available"));
    }

    #[test]
    fn test_next_theme_wraps() {
        assert_eq!(next_theme_name("monokai"), "github-dark");
        assert_eq!(next_theme_name("github-light"), "monokai");
    }
}
