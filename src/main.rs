//! splitdiff - side-by-side file comparison in the terminal
//!
//! Aligns two files line by line, highlights changed characters inside
//! changed lines and keeps both panes scrolled together.

mod adapters;
mod app;
mod config;
mod domain;
mod keymap;
mod ports;
mod search;
mod ui;

use adapters::{CrosstermTerminal, FsFileStore, JsonHistoryStore, SyntectHighlighter};
use anyhow::{Context, Result};
use clap::Parser;
use config::Overrides;
use crossterm::{
    event::DisableMouseCapture,
    execute,
    terminal::{disable_raw_mode, LeaveAlternateScreen},
};
use std::fs::File;
use std::io;
use std::panic;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_ENV_VAR: &str = "SPLITDIFF_LOG";

#[derive(Parser, Debug)]
#[command(name = "splitdiff")]
#[command(about = "Compare two files side by side")]
#[command(version)]
struct Args {
    /// Left-hand file
    file_a: Option<PathBuf>,

    /// Right-hand file
    file_b: Option<PathBuf>,

    /// Compare lines case-insensitively
    #[arg(long)]
    ignore_case: bool,

    /// Ignore leading and trailing whitespace
    #[arg(long)]
    ignore_whitespace: bool,

    /// Treat CRLF, CR and LF line endings as equal
    #[arg(long = "normalize-eol")]
    normalize_eol: bool,

    /// Fold long runs of unchanged lines
    #[arg(long)]
    fold: bool,

    /// Shortest unchanged run that gets folded
    #[arg(long, value_name = "N")]
    fold_threshold: Option<usize>,

    /// Unchanged lines kept visible on each side of a fold
    #[arg(long, value_name = "N")]
    fold_margin: Option<usize>,

    /// Colour theme (monokai, github-dark, github-light)
    #[arg(long, value_name = "NAME")]
    theme: Option<String>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            theme: self.theme.clone(),
            ignore_case: self.ignore_case,
            ignore_whitespace: self.ignore_whitespace,
            normalize_line_endings: self.normalize_eol,
            fold: self.fold,
            fold_threshold: self.fold_threshold,
            fold_margin: self.fold_margin,
        }
    }
}

/// Log to the file named by `SPLITDIFF_LOG`. The terminal belongs to the UI,
/// so nothing is logged when the variable is unset.
fn init_tracing() -> Result<()> {
    let Ok(log_path) = std::env::var(LOG_ENV_VAR) else {
        return Ok(());
    };

    let file = File::options()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("splitdiff=debug")))
        .try_init()
        .context("Failed to install log subscriber")?;
    Ok(())
}

fn main() -> Result<()> {
    // Set up panic hook to restore terminal on panic
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    let args = Args::parse();
    init_tracing()?;

    let env_theme = std::env::var(config::THEME_ENV_VAR).ok();
    let settings = config::load().with_overrides(&args.overrides(), env_theme.as_deref());
    ui::theme::set_theme(&settings.theme)?;
    tracing::info!(theme = %settings.theme, "starting");

    let history = JsonHistoryStore::new().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "no config directory, history kept in the temp directory");
        JsonHistoryStore::at(std::env::temp_dir().join("splitdiff-history.json"))
    });

    let mut app = app::App::new(
        Box::new(FsFileStore::new()),
        Box::new(history),
        Box::new(SyntectHighlighter::new()),
        settings,
        config::config_path(),
    );
    app.open_pair(args.file_a, args.file_b);

    let mut terminal = CrosstermTerminal::new().context("Failed to initialize terminal")?;
    let result = app.run(&mut terminal);

    // Terminal cleanup happens in Drop
    result
}
