//! File store port (trait).
//! Loading and saving the two compared files.

use crate::domain::LineSequence;
use anyhow::Result;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not valid UTF-8 text", path.display())]
    Decode { path: PathBuf },
}

impl LoadError {
    pub fn path(&self) -> &Path {
        match self {
            LoadError::Io { path, .. } | LoadError::Decode { path } => path,
        }
    }
}

pub trait FileStore {
    /// Read a file into lines, terminators kept verbatim.
    fn load(&self, path: &Path) -> Result<LineSequence, LoadError>;

    /// Write `lines` verbatim, then return what was actually written.
    fn save(&self, path: &Path, lines: &LineSequence) -> Result<LineSequence>;
}
