//! JSON file implementation of the HistoryStore port.

use crate::ports::{HistoryStore, RecentPair};
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

pub struct JsonHistoryStore {
    path: PathBuf,
}

impl JsonHistoryStore {
    /// History lives next to the settings file in the user's config directory.
    pub fn new() -> Result<Self> {
        let config_dir = dirs::config_dir().context("Could not find config directory")?;
        Ok(Self::at(config_dir.join("splitdiff").join("history.json")))
    }

    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }
}

impl HistoryStore for JsonHistoryStore {
    fn load(&self) -> Result<Vec<RecentPair>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;

        match serde_json::from_str(&content) {
            Ok(pairs) => Ok(pairs),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring corrupt history file");
                Ok(Vec::new())
            }
        }
    }

    fn store(&self, pairs: &[RecentPair]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content = serde_json::to_string_pretty(pairs)?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }
}
