//! Folding of long unchanged runs.

use super::types::{EditKind, EditOp};

pub const DEFAULT_FOLD_THRESHOLD: usize = 5;
pub const DEFAULT_FOLD_MARGIN: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoldOptions {
    pub enabled: bool,
    /// Minimum length of an equal run before it is folded.
    pub threshold: usize,
    /// Unfolded context lines kept at each end of a folded run.
    pub margin: usize,
}

impl Default for FoldOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            threshold: DEFAULT_FOLD_THRESHOLD,
            margin: DEFAULT_FOLD_MARGIN,
        }
    }
}

/// Split long equal runs into `equal(margin), fold(rest), equal(margin)`.
///
/// Ranges keep pointing into the original sequences, so line numbers after
/// a fold are unaffected.
pub fn fold_equal_runs(ops: &[EditOp], options: &FoldOptions) -> Vec<EditOp> {
    if !options.enabled {
        return ops.to_vec();
    }

    let mut folded = Vec::with_capacity(ops.len());
    let margin = options.margin;

    for op in ops {
        let len = op.a_len();
        let foldable = op.kind == EditKind::Equal
            && len == op.b_len()
            && len >= options.threshold
            && len > margin * 2;

        if !foldable {
            folded.push(*op);
            continue;
        }

        if margin > 0 {
            folded.push(EditOp::equal(op.a_start, op.a_start + margin, op.b_start, op.b_start + margin));
        }
        folded.push(EditOp::fold(
            op.a_start + margin,
            op.a_end - margin,
            op.b_start + margin,
            op.b_end - margin,
        ));
        if margin > 0 {
            folded.push(EditOp::equal(op.a_end - margin, op.a_end, op.b_end - margin, op.b_end));
        }
    }

    folded
}
