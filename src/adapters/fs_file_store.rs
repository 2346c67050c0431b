//! std::fs implementation of the FileStore port.

use crate::domain::LineSequence;
use crate::ports::{FileStore, LoadError};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

#[derive(Debug, Default)]
pub struct FsFileStore;

impl FsFileStore {
    pub fn new() -> Self {
        Self
    }
}

impl FileStore for FsFileStore {
    fn load(&self, path: &Path) -> Result<LineSequence, LoadError> {
        let bytes = fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8(bytes).map_err(|_| LoadError::Decode {
            path: path.to_path_buf(),
        })?;

        let lines = LineSequence::from_text(&text);
        tracing::info!(path = %path.display(), lines = lines.len(), "loaded file");
        Ok(lines)
    }

    fn save(&self, path: &Path, lines: &LineSequence) -> Result<LineSequence> {
        fs::write(path, lines.to_text())
            .with_context(|| format!("Failed to write {}", path.display()))?;

        // The in-memory copy must match the bytes on disk, not the buffer we sent
        let written = self
            .load(path)
            .with_context(|| format!("Failed to re-read {} after saving", path.display()))?;
        tracing::info!(path = %path.display(), lines = written.len(), "saved file");
        Ok(written)
    }
}
