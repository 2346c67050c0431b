//! Row lookups for diff-block jumps and go-to-line.
//! Pure functions over aligned rows; callers decide what to scroll.

use super::types::{AlignedRows, Side};

/// Row indices where each diff block starts.
pub fn diff_block_starts(rows: &AlignedRows) -> Vec<usize> {
    (0..rows.len())
        .filter(|&i| rows.is_diff_row(i) && (i == 0 || !rows.is_diff_row(i - 1)))
        .collect()
}

/// Start of the first diff block after `current`, wrapping to the first block.
pub fn next_diff_block(rows: &AlignedRows, current: usize) -> Option<usize> {
    let starts = diff_block_starts(rows);
    starts
        .iter()
        .copied()
        .find(|&start| start > current)
        .or_else(|| starts.first().copied())
}

/// Start of the last diff block before `current`, wrapping to the last block.
pub fn prev_diff_block(rows: &AlignedRows, current: usize) -> Option<usize> {
    let starts = diff_block_starts(rows);
    starts
        .iter()
        .rev()
        .copied()
        .find(|&start| start < current)
        .or_else(|| starts.last().copied())
}

/// Where a requested line number was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineLocation {
    pub side: Side,
    pub row: usize,
}

/// Find the row showing `line_number`, checking `preferred` first.
/// Returns `None` when the line is folded away or out of range.
pub fn locate_line(rows: &AlignedRows, preferred: Side, line_number: usize) -> Option<LineLocation> {
    [preferred, preferred.other()].into_iter().find_map(|side| {
        rows.pane(side)
            .iter()
            .position(|r| r.line_number == Some(line_number))
            .map(|row| LineLocation { side, row })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fold::FoldOptions;
    use crate::domain::layout::{compute_layout, LayoutOptions};
    use crate::domain::types::LineSequence;
    use pretty_assertions::assert_eq;

    fn rows_for(a: &[&str], b: &[&str], fold: bool) -> AlignedRows {
        let options = LayoutOptions {
            fold: FoldOptions {
                enabled: fold,
                ..Default::default()
            },
            ..Default::default()
        };
        compute_layout(
            &LineSequence::from_lines(a.iter().copied()),
            &LineSequence::from_lines(b.iter().copied()),
            &options,
        )
        .unwrap()
        .rows
    }

    fn two_blocks() -> AlignedRows {
        // rows: 0 eq, 1 changed, 2 eq, 3 eq, 4 deleted, 5 deleted, 6 eq
        rows_for(
            &["a\n", "b\n", "c\n", "d\n", "e\n", "f\n", "g\n"],
            &["a\n", "B\n", "c\n", "d\n", "g\n"],
            false,
        )
    }

    #[test]
    fn test_block_starts() {
        assert_eq!(diff_block_starts(&two_blocks()), vec![1, 4]);
    }

    #[test]
    fn test_next_block_wraps() {
        let rows = two_blocks();
        assert_eq!(next_diff_block(&rows, 0), Some(1));
        assert_eq!(next_diff_block(&rows, 1), Some(4));
        assert_eq!(next_diff_block(&rows, 4), Some(1));
    }

    #[test]
    fn test_prev_block_wraps() {
        let rows = two_blocks();
        assert_eq!(prev_diff_block(&rows, 6), Some(4));
        assert_eq!(prev_diff_block(&rows, 4), Some(1));
        assert_eq!(prev_diff_block(&rows, 1), Some(4));
    }

    #[test]
    fn test_no_blocks_in_identical_files() {
        let rows = rows_for(&["a\n", "b\n"], &["a\n", "b\n"], false);
        assert_eq!(next_diff_block(&rows, 0), None);
        assert_eq!(prev_diff_block(&rows, 0), None);
    }

    #[test]
    fn test_locate_line_prefers_requested_side() {
        let rows = rows_for(&["x\n", "same\n"], &["new\n", "x\n", "same\n"], false);
        assert_eq!(
            locate_line(&rows, Side::B, 2),
            Some(LineLocation { side: Side::B, row: 1 })
        );
        assert_eq!(
            locate_line(&rows, Side::A, 2),
            Some(LineLocation { side: Side::A, row: 2 })
        );
    }

    #[test]
    fn test_locate_line_falls_back_to_other_side() {
        let rows = rows_for(&["a\n"], &["a\n", "b\n", "c\n"], false);
        assert_eq!(
            locate_line(&rows, Side::A, 3),
            Some(LineLocation { side: Side::B, row: 2 })
        );
    }

    #[test]
    fn test_folded_line_is_not_found() {
        let lines: Vec<String> = (1..=20).map(|i| format!("{}\n", i)).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let rows = rows_for(&refs, &refs, true);
        assert_eq!(locate_line(&rows, Side::A, 10), None);
        assert_eq!(locate_line(&rows, Side::A, 20), Some(LineLocation { side: Side::A, row: 2 }));
        assert_eq!(locate_line(&rows, Side::A, 99), None);
    }
}
