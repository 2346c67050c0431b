//! Fuzzy search through the rows of both panes.

use crate::domain::{AlignedRows, Side};
use nucleo_matcher::{
    pattern::{CaseMatching, Normalization, Pattern},
    Config, Matcher, Utf32Str,
};

/// A searchable line in the current render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchableEntry {
    pub row: usize,
    pub side: Side,
    pub line_number: usize,
    pub content: String,
}

/// A search result with score and match indices.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub entry: SearchableEntry,
    pub score: u32,
    pub match_indices: Vec<u32>,
}

/// State for the search overlay.
#[derive(Debug, Clone, Default)]
pub struct FuzzySearchState {
    pub query: String,
    pub results: Vec<SearchResult>,
    pub selected_index: usize,
    pub scroll: usize,
}

impl FuzzySearchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_next(&mut self) {
        if !self.results.is_empty() {
            self.selected_index = (self.selected_index + 1).min(self.results.len() - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    /// Ensure selected item is visible in the list.
    pub fn ensure_visible(&mut self, visible_height: usize) {
        if visible_height == 0 {
            return;
        }
        if self.selected_index < self.scroll {
            self.scroll = self.selected_index;
        } else if self.selected_index >= self.scroll + visible_height {
            self.scroll = self.selected_index + 1 - visible_height;
        }
    }

    pub fn selected(&self) -> Option<&SearchResult> {
        self.results.get(self.selected_index)
    }

    /// Re-run the query against `index`, resetting the selection.
    pub fn refresh(&mut self, index: &[SearchableEntry], max_results: usize) {
        self.results = fuzzy_search(&self.query, index, max_results);
        self.selected_index = 0;
        self.scroll = 0;
    }
}

/// Index every non-blank line of both panes. Folded, placeholder and
/// notice rows are skipped.
pub fn build_search_index(rows: &AlignedRows) -> Vec<SearchableEntry> {
    let mut entries = Vec::with_capacity(rows.len() * 2);

    for side in [Side::A, Side::B] {
        for (row, record) in rows.pane(side).iter().enumerate() {
            let (Some(line_number), Some(text)) = (record.line_number, record.text()) else {
                continue;
            };
            if text.trim().is_empty() {
                continue;
            }
            entries.push(SearchableEntry {
                row,
                side,
                line_number,
                content: text.to_string(),
            });
        }
    }

    entries
}

/// Perform fuzzy search on the index. Equal scores keep index order.
pub fn fuzzy_search(query: &str, index: &[SearchableEntry], max_results: usize) -> Vec<SearchResult> {
    if query.is_empty() {
        return Vec::new();
    }

    let mut matcher = Matcher::new(Config::DEFAULT);
    let pattern = Pattern::parse(query, CaseMatching::Smart, Normalization::Smart);

    let mut results: Vec<SearchResult> = Vec::new();
    let mut buf = Vec::new();

    for entry in index {
        let haystack = Utf32Str::new(&entry.content, &mut buf);
        let mut indices = Vec::new();
        if let Some(score) = pattern.indices(haystack, &mut matcher, &mut indices) {
            results.push(SearchResult {
                entry: entry.clone(),
                score,
                match_indices: indices,
            });
        }
    }

    results.sort_by(|a, b| b.score.cmp(&a.score));
    results.truncate(max_results);

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{compute_layout, LayoutOptions, LineSequence};

    fn rows() -> AlignedRows {
        compute_layout(
            &LineSequence::from_text("fn main() {\n    old();\n}\n"),
            &LineSequence::from_text("fn main() {\n    helper();\n\n}\n"),
            &LayoutOptions::default(),
        )
        .unwrap()
        .rows
    }

    #[test]
    fn test_build_search_index_skips_blank_and_placeholder_rows() {
        let index = build_search_index(&rows());

        let a: Vec<&str> = index.iter().filter(|e| e.side == Side::A).map(|e| e.content.as_str()).collect();
        let b: Vec<&str> = index.iter().filter(|e| e.side == Side::B).map(|e| e.content.as_str()).collect();
        assert_eq!(a, vec!["fn main() {", "    old();", "}"]);
        assert_eq!(b, vec!["fn main() {", "    helper();", "}"]);
    }

    #[test]
    fn test_fuzzy_search_finds_line() {
        let index = build_search_index(&rows());
        let results = fuzzy_search("helper", &index, 100);

        assert!(!results.is_empty());
        let best = &results[0].entry;
        assert_eq!(best.side, Side::B);
        assert_eq!(best.line_number, 2);
        assert_eq!(best.row, 1);
    }

    #[test]
    fn test_empty_query() {
        let index = build_search_index(&rows());
        assert!(fuzzy_search("", &index, 100).is_empty());
    }

    #[test]
    fn test_selection_stays_in_bounds() {
        let index = build_search_index(&rows());
        let mut state = FuzzySearchState::new();
        state.query = "main".to_string();
        state.refresh(&index, 100);

        assert_eq!(state.results.len(), 2);
        state.select_next();
        state.select_next();
        assert_eq!(state.selected_index, 1);
        state.select_prev();
        state.select_prev();
        assert_eq!(state.selected_index, 0);
    }

    #[test]
    fn test_ensure_visible_scrolls() {
        let mut state = FuzzySearchState::new();
        state.selected_index = 7;
        state.ensure_visible(5);
        assert_eq!(state.scroll, 3);
        state.selected_index = 1;
        state.ensure_visible(5);
        assert_eq!(state.scroll, 1);
    }
}
