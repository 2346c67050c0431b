//! Character-level diff for one old/new line pair.

use super::types::{CharSpan, SpanTag};
use similar::{capture_diff_slices, Algorithm, DiffTag};

/// Spans to highlight on each side of a replaced line pair.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CharDiff {
    pub old: Vec<CharSpan>,
    pub new: Vec<CharSpan>,
}

/// Compare two lines (terminators already stripped) character by character.
/// Offsets are in chars, not bytes.
pub fn diff_chars(old: &str, new: &str) -> CharDiff {
    let old_chars: Vec<char> = old.chars().collect();
    let new_chars: Vec<char> = new.chars().collect();

    let mut result = CharDiff::default();

    for op in capture_diff_slices(Algorithm::Myers, &old_chars, &new_chars) {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        match tag {
            DiffTag::Equal => {}
            DiffTag::Delete => push_span(&mut result.old, SpanTag::Deleted, old_range.start, old_range.end),
            DiffTag::Insert => push_span(&mut result.new, SpanTag::Inserted, new_range.start, new_range.end),
            DiffTag::Replace => {
                push_span(&mut result.old, SpanTag::Deleted, old_range.start, old_range.end);
                push_span(&mut result.new, SpanTag::Inserted, new_range.start, new_range.end);
            }
        }
    }

    result
}

fn push_span(spans: &mut Vec<CharSpan>, tag: SpanTag, start: usize, end: usize) {
    if start == end {
        return;
    }
    // Adjacent ranges from the matcher read better as one highlight
    match spans.last_mut() {
        Some(last) if last.tag == tag && last.end == start => last.end = end,
        _ => spans.push(CharSpan::new(tag, start, end)),
    }
}
