//! Alignment of edit ops into two index-aligned row lists.
//!
//! The builder is a pure function of its inputs: the same sequences and ops
//! always produce the same rows. Any inconsistency in the ops aborts the
//! pass with a [`LayoutError`]; rows are never clamped into place.

use super::char_diff::diff_chars;
use super::fold::{fold_equal_runs, FoldOptions};
use super::line_diff::{diff_lines, DiffOptions};
use super::types::{
    AlignedRows, DiffStats, EditKind, EditOp, LineSequence, RowClass, RowRecord, Side,
};
use thiserror::Error;

pub const BOTH_EMPTY_NOTICE: &str = "Both files are empty.";
pub const EMPTY_FILE_NOTICE: &str = "<Empty File>";

/// Contract violations found while aligning ops.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("op #{index} has a reversed range: {op}")]
    ReversedRange { index: usize, op: EditOp },

    #[error("op #{index} does not continue at a {expected_a}, b {expected_b}: {op}")]
    Discontiguous {
        index: usize,
        op: EditOp,
        expected_a: usize,
        expected_b: usize,
    },

    #[error("op #{index} runs past the input (a has {len_a} lines, b has {len_b}): {op}")]
    OutOfBounds {
        index: usize,
        op: EditOp,
        len_a: usize,
        len_b: usize,
    },

    #[error("op #{index} has range lengths that do not fit its kind: {op}")]
    KindMismatch { index: usize, op: EditOp },

    #[error("ops cover a 0..{covered_a} and b 0..{covered_b}, expected a 0..{len_a} and b 0..{len_b}")]
    IncompleteCoverage {
        covered_a: usize,
        covered_b: usize,
        len_a: usize,
        len_b: usize,
    },

    #[error("pane row counts diverged after op #{index}: a has {rows_a} rows, b has {rows_b}")]
    PaneMismatch {
        index: usize,
        rows_a: usize,
        rows_b: usize,
    },
}

/// Options that shape a layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutOptions {
    pub diff: DiffOptions,
    pub fold: FoldOptions,
}

/// Everything derived from one diff pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiffLayout {
    pub ops: Vec<EditOp>,
    pub rows: AlignedRows,
    pub stats: DiffStats,
}

/// Diff, fold and align two sequences in one pass.
pub fn compute_layout(
    a: &LineSequence,
    b: &LineSequence,
    options: &LayoutOptions,
) -> Result<DiffLayout, LayoutError> {
    let ops = diff_lines(a, b, &options.diff);
    let stats = count_changes(&ops);
    let ops = fold_equal_runs(&ops, &options.fold);
    let rows = align(a, b, &ops)?;
    Ok(DiffLayout { ops, rows, stats })
}

/// Count added, deleted and changed lines across the ops.
pub fn count_changes(ops: &[EditOp]) -> DiffStats {
    ops.iter().fold(DiffStats::default(), |mut stats, op| {
        match op.kind {
            EditKind::Insert => stats.added += op.b_len(),
            EditKind::Delete => stats.deleted += op.a_len(),
            EditKind::Replace => {
                let paired = op.a_len().min(op.b_len());
                stats.changed += paired;
                stats.deleted += op.a_len() - paired;
                stats.added += op.b_len() - paired;
            }
            EditKind::Equal | EditKind::Fold => {}
        }
        stats
    })
}

/// Expand ops into rows for both panes.
///
/// An empty op list is not an error: it means both inputs are empty (one
/// notice row per pane) or the matcher had nothing to report (raw rows).
pub fn align(a: &LineSequence, b: &LineSequence, ops: &[EditOp]) -> Result<AlignedRows, LayoutError> {
    if ops.is_empty() {
        return Ok(raw_rows(a, b));
    }

    let mut rows_a = Vec::with_capacity(a.len().max(b.len()));
    let mut rows_b = Vec::with_capacity(a.len().max(b.len()));
    let mut next_a = 0;
    let mut next_b = 0;

    for (index, op) in ops.iter().enumerate() {
        check_op(index, op, next_a, next_b, a.len(), b.len())?;

        match op.kind {
            EditKind::Equal => {
                for offset in 0..op.a_len() {
                    rows_a.push(line_row(a, op.a_start + offset, RowClass::Equal));
                    rows_b.push(line_row(b, op.b_start + offset, RowClass::Equal));
                }
            }
            EditKind::Fold => {
                rows_a.push(RowRecord::folded(op.a_len()));
                rows_b.push(RowRecord::folded(op.b_len()));
            }
            EditKind::Delete => {
                for offset in 0..op.a_len() {
                    rows_a.push(line_row(a, op.a_start + offset, RowClass::Deleted));
                    rows_b.push(RowRecord::placeholder());
                }
            }
            EditKind::Insert => {
                for offset in 0..op.b_len() {
                    rows_a.push(RowRecord::placeholder());
                    rows_b.push(line_row(b, op.b_start + offset, RowClass::Added));
                }
            }
            EditKind::Replace => {
                let (len_a, len_b) = (op.a_len(), op.b_len());
                for offset in 0..len_a.max(len_b) {
                    match (offset < len_a, offset < len_b) {
                        (true, true) => {
                            let old = line_row(a, op.a_start + offset, RowClass::Changed);
                            let new = line_row(b, op.b_start + offset, RowClass::Changed);
                            let spans = diff_chars(
                                old.text().unwrap_or_default(),
                                new.text().unwrap_or_default(),
                            );
                            rows_a.push(old.with_spans(spans.old));
                            rows_b.push(new.with_spans(spans.new));
                        }
                        (true, false) => {
                            rows_a.push(line_row(a, op.a_start + offset, RowClass::Deleted));
                            rows_b.push(RowRecord::placeholder());
                        }
                        (false, true) => {
                            rows_a.push(RowRecord::placeholder());
                            rows_b.push(line_row(b, op.b_start + offset, RowClass::Added));
                        }
                        (false, false) => unreachable!("offset is below the longer side"),
                    }
                }
            }
        }

        if rows_a.len() != rows_b.len() {
            return Err(LayoutError::PaneMismatch {
                index,
                rows_a: rows_a.len(),
                rows_b: rows_b.len(),
            });
        }

        next_a = op.a_end;
        next_b = op.b_end;
    }

    if next_a != a.len() || next_b != b.len() {
        return Err(LayoutError::IncompleteCoverage {
            covered_a: next_a,
            covered_b: next_b,
            len_a: a.len(),
            len_b: b.len(),
        });
    }

    let (len_a, len_b) = (rows_a.len(), rows_b.len());
    AlignedRows::pair(rows_a, rows_b).ok_or(LayoutError::PaneMismatch {
        index: ops.len() - 1,
        rows_a: len_a,
        rows_b: len_b,
    })
}

/// Rows for a single loaded side; the other pane is all placeholders.
pub fn single_side(side: Side, lines: &LineSequence) -> AlignedRows {
    let shown: Vec<RowRecord> = if lines.is_empty() {
        vec![RowRecord::notice(EMPTY_FILE_NOTICE)]
    } else {
        (0..lines.len())
            .map(|i| line_row(lines, i, RowClass::Equal))
            .collect()
    };
    let blank = vec![RowRecord::placeholder(); shown.len()];

    let pair = match side {
        Side::A => AlignedRows::pair(shown, blank),
        Side::B => AlignedRows::pair(blank, shown),
    };
    pair.unwrap_or_default()
}

fn raw_rows(a: &LineSequence, b: &LineSequence) -> AlignedRows {
    if a.is_empty() && b.is_empty() {
        return AlignedRows::pair(
            vec![RowRecord::notice(BOTH_EMPTY_NOTICE)],
            vec![RowRecord::notice(BOTH_EMPTY_NOTICE)],
        )
        .unwrap_or_default();
    }

    let total = a.len().max(b.len());
    let side_rows = |lines: &LineSequence| -> Vec<RowRecord> {
        (0..total)
            .map(|i| {
                if i < lines.len() {
                    line_row(lines, i, RowClass::Equal)
                } else {
                    RowRecord::placeholder()
                }
            })
            .collect()
    };

    AlignedRows::pair(side_rows(a), side_rows(b)).unwrap_or_default()
}

fn line_row(lines: &LineSequence, index: usize, class: RowClass) -> RowRecord {
    // Bounds were validated by check_op before any row is built
    RowRecord::line(index, lines.get(index).unwrap_or_default(), class)
}

fn check_op(
    index: usize,
    op: &EditOp,
    expected_a: usize,
    expected_b: usize,
    len_a: usize,
    len_b: usize,
) -> Result<(), LayoutError> {
    if op.a_end < op.a_start || op.b_end < op.b_start {
        return Err(LayoutError::ReversedRange { index, op: *op });
    }
    if op.a_start != expected_a || op.b_start != expected_b {
        return Err(LayoutError::Discontiguous {
            index,
            op: *op,
            expected_a,
            expected_b,
        });
    }
    if op.a_end > len_a || op.b_end > len_b {
        return Err(LayoutError::OutOfBounds {
            index,
            op: *op,
            len_a,
            len_b,
        });
    }

    let (la, lb) = (op.a_len(), op.b_len());
    let fits = match op.kind {
        EditKind::Equal | EditKind::Fold => la == lb && la > 0,
        EditKind::Replace => la > 0 && lb > 0,
        EditKind::Delete => la > 0 && lb == 0,
        EditKind::Insert => la == 0 && lb > 0,
    };
    if !fits {
        return Err(LayoutError::KindMismatch { index, op: *op });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{CharSpan, SpanTag};
    use pretty_assertions::assert_eq;

    fn seq(lines: &[&str]) -> LineSequence {
        LineSequence::from_lines(lines.iter().copied())
    }

    fn numbers(rows: &AlignedRows, side: Side) -> Vec<Option<usize>> {
        rows.pane(side).iter().map(|r| r.line_number).collect()
    }

    fn classes(rows: &AlignedRows, side: Side) -> Vec<RowClass> {
        rows.pane(side).iter().map(|r| r.class).collect()
    }

    #[test]
    fn test_replaced_line_is_changed_with_char_spans() {
        let a = seq(&["a\n", "b\n", "c\n"]);
        let b = seq(&["a\n", "x\n", "c\n"]);
        let layout = compute_layout(&a, &b, &LayoutOptions::default()).unwrap();

        assert_eq!(
            layout.ops,
            vec![
                EditOp::equal(0, 1, 0, 1),
                EditOp::replace(1, 2, 1, 2),
                EditOp::equal(2, 3, 2, 3),
            ]
        );
        let row_a = layout.rows.row(Side::A, 1).unwrap();
        let row_b = layout.rows.row(Side::B, 1).unwrap();
        assert_eq!(row_a.class, RowClass::Changed);
        assert_eq!(row_b.class, RowClass::Changed);
        assert_eq!(row_a.char_spans, vec![CharSpan::new(SpanTag::Deleted, 0, 1)]);
        assert_eq!(row_b.char_spans, vec![CharSpan::new(SpanTag::Inserted, 0, 1)]);
        assert_eq!(layout.stats, DiffStats { added: 0, deleted: 0, changed: 1 });
    }

    #[test]
    fn test_insert_into_empty_side() {
        let layout = compute_layout(&seq(&[]), &seq(&["hello\n"]), &LayoutOptions::default()).unwrap();

        assert_eq!(layout.ops, vec![EditOp::insert(0, 0, 1)]);
        assert_eq!(layout.rows.len(), 1);
        let row_a = layout.rows.row(Side::A, 0).unwrap();
        assert!(row_a.placeholder);
        assert_eq!(row_a.line_number, None);
        assert_eq!(row_a.content, None);

        let row_b = layout.rows.row(Side::B, 0).unwrap();
        assert_eq!(row_b.line_number, Some(1));
        assert_eq!(row_b.text(), Some("hello"));
        assert_eq!(row_b.class, RowClass::Added);
    }

    #[test]
    fn test_folded_identical_files() {
        let lines: Vec<String> = (1..=20).map(|i| format!("line {}\n", i)).collect();
        let a = LineSequence::from_lines(lines.clone());
        let b = LineSequence::from_lines(lines);
        let options = LayoutOptions {
            fold: FoldOptions {
                enabled: true,
                threshold: 5,
                margin: 1,
            },
            ..Default::default()
        };
        let layout = compute_layout(&a, &b, &options).unwrap();

        for side in [Side::A, Side::B] {
            assert_eq!(
                classes(&layout.rows, side),
                vec![RowClass::Equal, RowClass::Folded { hidden: 18 }, RowClass::Equal]
            );
            assert_eq!(numbers(&layout.rows, side), vec![Some(1), None, Some(20)]);
        }
    }

    #[test]
    fn test_ignore_case_keeps_original_text() {
        let options = LayoutOptions {
            diff: DiffOptions {
                ignore_case: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let layout = compute_layout(&seq(&["Hello\n"]), &seq(&["hello\n"]), &options).unwrap();

        assert_eq!(layout.ops, vec![EditOp::equal(0, 1, 0, 1)]);
        assert_eq!(layout.rows.row(Side::A, 0).unwrap().text(), Some("Hello"));
        assert_eq!(layout.rows.row(Side::B, 0).unwrap().text(), Some("hello"));
        assert!(layout.stats.is_identical());
    }

    #[test]
    fn test_uneven_replace_pads_shorter_side() {
        let a = seq(&["one\n", "two\n", "three\n"]);
        let b = seq(&["uno\n"]);
        let rows = align(&a, &b, &[EditOp::replace(0, 3, 0, 1)]).unwrap();

        assert_eq!(
            classes(&rows, Side::A),
            vec![RowClass::Changed, RowClass::Deleted, RowClass::Deleted]
        );
        assert_eq!(
            classes(&rows, Side::B),
            vec![RowClass::Changed, RowClass::Placeholder, RowClass::Placeholder]
        );
        // Only the paired line gets char-level highlighting
        assert!(rows.row(Side::A, 1).unwrap().char_spans.is_empty());
        assert!(!rows.row(Side::A, 0).unwrap().char_spans.is_empty());
    }

    #[test]
    fn test_line_numbers_follow_shifted_equal_runs() {
        let a = seq(&["x\n", "same\n"]);
        let b = seq(&["new1\n", "new2\n", "x\n", "same\n"]);
        let rows = align(&a, &b, &[EditOp::insert(0, 0, 2), EditOp::equal(0, 2, 2, 4)]).unwrap();

        assert_eq!(numbers(&rows, Side::A), vec![None, None, Some(1), Some(2)]);
        assert_eq!(numbers(&rows, Side::B), vec![Some(1), Some(2), Some(3), Some(4)]);
    }

    #[test]
    fn test_both_empty_renders_notice() {
        let layout = compute_layout(&seq(&[]), &seq(&[]), &LayoutOptions::default()).unwrap();
        assert!(layout.ops.is_empty());
        assert_eq!(layout.rows.len(), 1);
        assert_eq!(layout.rows.row(Side::A, 0).unwrap().class, RowClass::Notice);
        assert_eq!(layout.rows.row(Side::B, 0).unwrap().text(), Some(BOTH_EMPTY_NOTICE));
    }

    #[test]
    fn test_no_ops_and_single_equal_render_the_same() {
        let a = seq(&["one\n", "two\n"]);
        let raw = align(&a, &a, &[]).unwrap();
        let full = align(&a, &a, &[EditOp::equal(0, 2, 0, 2)]).unwrap();
        assert_eq!(raw, full);
    }

    #[test]
    fn test_self_diff_renders_content_verbatim() {
        let a = seq(&["fn main() {\n", "    body();\r\n", "}"]);
        let layout = compute_layout(&a, &a, &LayoutOptions::default()).unwrap();
        for side in [Side::A, Side::B] {
            let content: Vec<&str> = layout
                .rows
                .pane(side)
                .iter()
                .filter_map(|r| r.content.as_deref())
                .collect();
            assert_eq!(content, a.lines().iter().map(String::as_str).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_align_is_idempotent() {
        let a = seq(&["a\n", "b\n", "c\n", "d\n"]);
        let b = seq(&["a\n", "B\n", "c\n", "e\n", "f\n"]);
        let ops = diff_lines(&a, &b, &DiffOptions::default());
        assert_eq!(align(&a, &b, &ops).unwrap(), align(&a, &b, &ops).unwrap());
    }

    #[test]
    fn test_panes_always_have_equal_length() {
        let cases: &[(&[&str], &[&str])] = &[
            (&["a\n"], &[]),
            (&[], &["a\n", "b\n"]),
            (&["a\n", "b\n", "c\n"], &["c\n", "b\n", "a\n"]),
            (&["1\n", "2\n", "3\n", "4\n"], &["1\n", "x\n", "y\n", "z\n", "4\n"]),
            (&["same\n"; 12], &["same\n"; 3]),
        ];
        let options = LayoutOptions {
            fold: FoldOptions {
                enabled: true,
                ..Default::default()
            },
            ..Default::default()
        };
        for (a, b) in cases {
            let layout = compute_layout(&seq(a), &seq(b), &options).unwrap();
            assert_eq!(layout.rows.pane(Side::A).len(), layout.rows.pane(Side::B).len());
        }
    }

    #[test]
    fn test_fold_does_not_change_visible_line_numbers() {
        let mut a_lines: Vec<String> = (1..=30).map(|i| format!("{}\n", i)).collect();
        let b_lines = a_lines.clone();
        a_lines[14] = "changed\n".to_string();
        let a = LineSequence::from_lines(a_lines);
        let b = LineSequence::from_lines(b_lines);

        let plain = compute_layout(&a, &b, &LayoutOptions::default()).unwrap();
        let folded = compute_layout(
            &a,
            &b,
            &LayoutOptions {
                fold: FoldOptions {
                    enabled: true,
                    ..Default::default()
                },
                ..Default::default()
            },
        )
        .unwrap();

        for side in [Side::A, Side::B] {
            let plain_rows = plain.rows.pane(side);
            for row in folded.rows.pane(side).iter().filter(|r| r.is_line()) {
                let same = plain_rows
                    .iter()
                    .find(|p| p.line_number == row.line_number)
                    .unwrap();
                assert_eq!(same.content, row.content);
            }
        }
        assert!(folded.rows.len() < plain.rows.len());
    }

    #[test]
    fn test_reversed_range_fails_fast() {
        let a = seq(&["a\n", "b\n"]);
        let op = EditOp::equal(2, 0, 0, 2);
        assert_eq!(
            align(&a, &a, &[op]),
            Err(LayoutError::ReversedRange { index: 0, op })
        );
    }

    #[test]
    fn test_gap_between_ops_fails_fast() {
        let a = seq(&["a\n", "b\n", "c\n"]);
        let err = align(&a, &a, &[EditOp::equal(0, 1, 0, 1), EditOp::equal(2, 3, 2, 3)]).unwrap_err();
        assert!(matches!(err, LayoutError::Discontiguous { index: 1, .. }));
    }

    #[test]
    fn test_out_of_bounds_fails_fast() {
        let a = seq(&["a\n"]);
        let err = align(&a, &a, &[EditOp::equal(0, 2, 0, 2)]).unwrap_err();
        assert!(matches!(err, LayoutError::OutOfBounds { .. }));
    }

    #[test]
    fn test_equal_with_uneven_lengths_fails_fast() {
        let a = seq(&["a\n", "b\n"]);
        let b = seq(&["a\n"]);
        let err = align(&a, &b, &[EditOp::equal(0, 2, 0, 1)]).unwrap_err();
        assert!(matches!(err, LayoutError::KindMismatch { .. }));
    }

    #[test]
    fn test_incomplete_coverage_fails_fast() {
        let a = seq(&["a\n", "b\n"]);
        let err = align(&a, &a, &[EditOp::equal(0, 1, 0, 1)]).unwrap_err();
        assert_eq!(
            err,
            LayoutError::IncompleteCoverage {
                covered_a: 1,
                covered_b: 1,
                len_a: 2,
                len_b: 2,
            }
        );
    }

    #[test]
    fn test_single_side_rows() {
        let rows = single_side(Side::B, &seq(&["x\n", "y\n"]));
        assert_eq!(numbers(&rows, Side::B), vec![Some(1), Some(2)]);
        assert!(rows.pane(Side::A).iter().all(|r| r.placeholder));

        let empty = single_side(Side::A, &seq(&[]));
        assert_eq!(empty.row(Side::A, 0).unwrap().text(), Some(EMPTY_FILE_NOTICE));
    }

    #[test]
    fn test_count_changes_splits_uneven_replace() {
        let stats = count_changes(&[EditOp::replace(0, 3, 0, 1), EditOp::insert(3, 1, 3)]);
        assert_eq!(stats, DiffStats { added: 2, deleted: 2, changed: 1 });
    }
}
