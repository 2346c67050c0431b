//! Persisted settings.
//!
//! Read from `config.toml` in the user's config directory. Command-line flags
//! and `SPLITDIFF_THEME` are layered on top at startup.

use crate::domain::{DiffOptions, FoldOptions, LayoutOptions};
use crate::ui::theme::DEFAULT_THEME;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const THEME_ENV_VAR: &str = "SPLITDIFF_THEME";
pub const DEFAULT_TAB_WIDTH: usize = 4;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: String,
    pub tab_width: usize,
    pub diff: DiffSettings,
    pub fold: FoldSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffSettings {
    pub ignore_case: bool,
    pub ignore_whitespace: bool,
    pub normalize_line_endings: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoldSettings {
    pub enabled: bool,
    pub threshold: usize,
    pub margin: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: DEFAULT_THEME.to_string(),
            tab_width: DEFAULT_TAB_WIDTH,
            diff: DiffSettings::default(),
            fold: FoldSettings::default(),
        }
    }
}

impl Default for FoldSettings {
    fn default() -> Self {
        let defaults = FoldOptions::default();
        Self {
            enabled: defaults.enabled,
            threshold: defaults.threshold,
            margin: defaults.margin,
        }
    }
}

/// Values given on the command line. `None`/`false` leaves the file value alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub theme: Option<String>,
    pub ignore_case: bool,
    pub ignore_whitespace: bool,
    pub normalize_line_endings: bool,
    pub fold: bool,
    pub fold_threshold: Option<usize>,
    pub fold_margin: Option<usize>,
}

impl Settings {
    /// Layer CLI flags and the theme environment variable over file values.
    /// The CLI theme beats the environment, which beats the file.
    pub fn with_overrides(mut self, overrides: &Overrides, env_theme: Option<&str>) -> Self {
        if let Some(theme) = env_theme.map(str::trim).filter(|t| !t.is_empty()) {
            self.theme = theme.to_string();
        }
        if let Some(theme) = &overrides.theme {
            self.theme = theme.clone();
        }

        self.diff.ignore_case |= overrides.ignore_case;
        self.diff.ignore_whitespace |= overrides.ignore_whitespace;
        self.diff.normalize_line_endings |= overrides.normalize_line_endings;

        self.fold.enabled |= overrides.fold;
        if let Some(threshold) = overrides.fold_threshold {
            self.fold.threshold = threshold;
        }
        if let Some(margin) = overrides.fold_margin {
            self.fold.margin = margin;
        }
        self
    }

    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            diff: DiffOptions {
                normalize_line_endings: self.diff.normalize_line_endings,
                ignore_whitespace: self.diff.ignore_whitespace,
                ignore_case: self.diff.ignore_case,
            },
            fold: FoldOptions {
                enabled: self.fold.enabled,
                threshold: self.fold.threshold.max(1),
                margin: self.fold.margin,
            },
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("splitdiff").join("config.toml"))
}

/// Read settings from `path`. A missing file yields the defaults.
pub fn load_from(path: &Path) -> Result<Settings, ConfigError> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let text = fs::read_to_string(path)?;
    Ok(toml::from_str(&text)?)
}

/// Settings from the default location, falling back to defaults on any error.
pub fn load() -> Settings {
    let Some(path) = config_path() else {
        tracing::warn!("no config directory, using default settings");
        return Settings::default();
    };
    match load_from(&path) {
        Ok(settings) => {
            tracing::info!(path = %path.display(), "loaded settings");
            settings
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable settings");
            Settings::default()
        }
    }
}

pub fn save_to(path: &Path, settings: &Settings) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, toml::to_string_pretty(settings)?)?;
    Ok(())
}
