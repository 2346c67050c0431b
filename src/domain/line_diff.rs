//! Line-level diff between two sequences.
//!
//! Matching runs on filtered copies of the lines; the ranges in the
//! returned ops index the original, unfiltered sequences.

use super::types::{EditKind, EditOp, LineSequence};
use similar::{capture_diff_slices, Algorithm, DiffTag};
use std::borrow::Cow;

/// Filters applied to each line before matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiffOptions {
    /// Treat CRLF and lone CR as LF.
    pub normalize_line_endings: bool,
    /// Ignore leading and trailing whitespace (terminator included).
    pub ignore_whitespace: bool,
    pub ignore_case: bool,
}

/// Apply the enabled filters in a fixed order: line endings, whitespace, case.
pub fn filter_line<'a>(line: &'a str, options: &DiffOptions) -> Cow<'a, str> {
    let mut text = Cow::Borrowed(line);

    if options.normalize_line_endings && text.contains('\r') {
        text = Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"));
    }

    if options.ignore_whitespace {
        let trimmed = text.trim();
        if trimmed.len() != text.len() {
            text = Cow::Owned(trimmed.to_string());
        }
    }

    if options.ignore_case {
        text = Cow::Owned(text.to_lowercase());
    }

    text
}

/// Compute the ordered edit ops turning `a` into `b`.
///
/// Returns an empty list when both sequences are empty.
pub fn diff_lines(a: &LineSequence, b: &LineSequence, options: &DiffOptions) -> Vec<EditOp> {
    let old: Vec<Cow<'_, str>> = a.lines().iter().map(|l| filter_line(l, options)).collect();
    let new: Vec<Cow<'_, str>> = b.lines().iter().map(|l| filter_line(l, options)).collect();

    let ops = capture_diff_slices(Algorithm::Myers, &old, &new)
        .iter()
        .map(|op| {
            let (tag, old_range, new_range) = op.as_tag_tuple();
            let kind = match tag {
                DiffTag::Equal => EditKind::Equal,
                DiffTag::Delete => EditKind::Delete,
                DiffTag::Insert => EditKind::Insert,
                DiffTag::Replace => EditKind::Replace,
            };
            EditOp::new(kind, old_range.start, old_range.end, new_range.start, new_range.end)
        })
        .collect();

    let ops = coalesce(ops);
    tracing::debug!(lines_a = a.len(), lines_b = b.len(), ops = ops.len(), "line diff computed");
    ops
}

/// Merge adjacent ops of the same kind and drop empty ones.
fn coalesce(ops: Vec<EditOp>) -> Vec<EditOp> {
    let mut merged: Vec<EditOp> = Vec::with_capacity(ops.len());

    for op in ops {
        if op.a_len() == 0 && op.b_len() == 0 {
            continue;
        }
        match merged.last_mut() {
            Some(last)
                if last.kind == op.kind
                    && last.a_end == op.a_start
                    && last.b_end == op.b_start =>
            {
                last.a_end = op.a_end;
                last.b_end = op.b_end;
            }
            _ => merged.push(op),
        }
    }

    merged
}
