//! History port (trait).
//! Persists the list of recently compared file pairs.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const MAX_RECENT_PAIRS: usize = 10;

/// A pair of files that were opened together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentPair {
    pub a: PathBuf,
    pub b: PathBuf,
    pub opened_at: i64, // Unix timestamp in milliseconds
}

impl RecentPair {
    pub fn same_files(&self, other: &RecentPair) -> bool {
        self.a == other.a && self.b == other.b
    }
}

pub trait HistoryStore {
    /// Most recent first.
    fn load(&self) -> Result<Vec<RecentPair>>;

    fn store(&self, pairs: &[RecentPair]) -> Result<()>;
}

/// Put `pair` at the front, dropping an older entry for the same files
/// and anything past the cap.
pub fn remember(mut pairs: Vec<RecentPair>, pair: RecentPair) -> Vec<RecentPair> {
    pairs.retain(|p| !p.same_files(&pair));
    pairs.insert(0, pair);
    pairs.truncate(MAX_RECENT_PAIRS);
    pairs
}
