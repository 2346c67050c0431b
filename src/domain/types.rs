//! Pure data types for the side-by-side comparison domain.
//! No I/O, no dependencies on external crates beyond std.

use std::fmt;

/// One of the two compared inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Side::A => "A",
            Side::B => "B",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }
}

/// An ordered list of text lines, each keeping its original terminator.
///
/// Never mutated in place: loads, edit commits and saves build a new
/// sequence and replace the old one wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineSequence {
    lines: Vec<String>,
}

impl LineSequence {
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.split_inclusive('\n').map(String::from).collect(),
        }
    }

    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Concatenate the lines back into the exact text they came from.
    pub fn to_text(&self) -> String {
        self.lines.concat()
    }

    /// Build a new sequence with line `index` replaced by `text`.
    /// The replaced line keeps its original terminator.
    pub fn with_line_replaced(&self, index: usize, text: &str) -> Option<Self> {
        let old = self.lines.get(index)?;
        let terminator = &old[strip_terminator(old).len()..];
        let mut lines = self.lines.clone();
        lines[index] = format!("{}{}", strip_terminator(text), terminator);
        Some(Self { lines })
    }
}

/// Strip a trailing `\r\n`, `\n` or `\r` from a line.
pub fn strip_terminator(line: &str) -> &str {
    line.strip_suffix("\r\n")
        .or_else(|| line.strip_suffix('\n'))
        .or_else(|| line.strip_suffix('\r'))
        .unwrap_or(line)
}

/// Kind of an edit operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditKind {
    Equal,
    Replace,
    Delete,
    Insert,
    /// An equal run hidden behind a single summary row.
    Fold,
}

impl EditKind {
    pub fn name(self) -> &'static str {
        match self {
            EditKind::Equal => "equal",
            EditKind::Replace => "replace",
            EditKind::Delete => "delete",
            EditKind::Insert => "insert",
            EditKind::Fold => "fold",
        }
    }
}

/// An edit over half-open ranges of both sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EditOp {
    pub kind: EditKind,
    pub a_start: usize,
    pub a_end: usize,
    pub b_start: usize,
    pub b_end: usize,
}

impl EditOp {
    pub fn new(kind: EditKind, a_start: usize, a_end: usize, b_start: usize, b_end: usize) -> Self {
        Self {
            kind,
            a_start,
            a_end,
            b_start,
            b_end,
        }
    }

    pub fn equal(a_start: usize, a_end: usize, b_start: usize, b_end: usize) -> Self {
        Self::new(EditKind::Equal, a_start, a_end, b_start, b_end)
    }

    pub fn replace(a_start: usize, a_end: usize, b_start: usize, b_end: usize) -> Self {
        Self::new(EditKind::Replace, a_start, a_end, b_start, b_end)
    }

    pub fn delete(a_start: usize, a_end: usize, b_at: usize) -> Self {
        Self::new(EditKind::Delete, a_start, a_end, b_at, b_at)
    }

    pub fn insert(a_at: usize, b_start: usize, b_end: usize) -> Self {
        Self::new(EditKind::Insert, a_at, a_at, b_start, b_end)
    }

    pub fn fold(a_start: usize, a_end: usize, b_start: usize, b_end: usize) -> Self {
        Self::new(EditKind::Fold, a_start, a_end, b_start, b_end)
    }

    pub fn a_len(&self) -> usize {
        self.a_end.saturating_sub(self.a_start)
    }

    pub fn b_len(&self) -> usize {
        self.b_end.saturating_sub(self.b_start)
    }
}

impl fmt::Display for EditOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}(a {}..{}, b {}..{})",
            self.kind.name(),
            self.a_start,
            self.a_end,
            self.b_start,
            self.b_end
        )
    }
}

/// Whether a character span was removed from the old line or added to the new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpanTag {
    Inserted,
    Deleted,
}

/// Half-open character range inside one line's content (terminator excluded).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CharSpan {
    pub tag: SpanTag,
    pub start: usize,
    pub end: usize,
}

impl CharSpan {
    pub fn new(tag: SpanTag, start: usize, end: usize) -> Self {
        Self { tag, start, end }
    }

    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index < self.end
    }
}

/// Background class of a rendered row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowClass {
    Equal,
    Added,
    Deleted,
    Changed,
    Folded { hidden: usize },
    Placeholder,
    Notice,
}

/// One rendered line in one pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRecord {
    /// 1-based line number in the original sequence.
    pub line_number: Option<usize>,
    /// Original line text, terminator included.
    pub content: Option<String>,
    pub placeholder: bool,
    pub char_spans: Vec<CharSpan>,
    pub class: RowClass,
}

impl RowRecord {
    pub fn line(index: usize, content: &str, class: RowClass) -> Self {
        Self {
            line_number: Some(index + 1),
            content: Some(content.to_string()),
            placeholder: false,
            char_spans: Vec::new(),
            class,
        }
    }

    pub fn placeholder() -> Self {
        Self {
            line_number: None,
            content: None,
            placeholder: true,
            char_spans: Vec::new(),
            class: RowClass::Placeholder,
        }
    }

    pub fn folded(hidden: usize) -> Self {
        Self {
            line_number: None,
            content: None,
            placeholder: false,
            char_spans: Vec::new(),
            class: RowClass::Folded { hidden },
        }
    }

    pub fn notice(message: &str) -> Self {
        Self {
            line_number: None,
            content: Some(message.to_string()),
            placeholder: false,
            char_spans: Vec::new(),
            class: RowClass::Notice,
        }
    }

    pub fn with_spans(mut self, spans: Vec<CharSpan>) -> Self {
        self.char_spans = spans;
        self
    }

    /// Display text with the terminator stripped.
    pub fn text(&self) -> Option<&str> {
        self.content.as_deref().map(strip_terminator)
    }

    /// True for rows that belong to a diff block.
    pub fn is_diff(&self) -> bool {
        matches!(
            self.class,
            RowClass::Added | RowClass::Deleted | RowClass::Changed | RowClass::Placeholder
        )
    }

    /// True for rows backed by a real line of the input.
    pub fn is_line(&self) -> bool {
        self.line_number.is_some()
    }
}

/// The two index-aligned row lists, one per pane.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AlignedRows {
    a: Vec<RowRecord>,
    b: Vec<RowRecord>,
}

impl AlignedRows {
    /// Pair two row lists. Returns `None` when their lengths differ.
    pub fn pair(a: Vec<RowRecord>, b: Vec<RowRecord>) -> Option<Self> {
        (a.len() == b.len()).then_some(Self { a, b })
    }

    pub fn pane(&self, side: Side) -> &[RowRecord] {
        match side {
            Side::A => &self.a,
            Side::B => &self.b,
        }
    }

    pub fn row(&self, side: Side, index: usize) -> Option<&RowRecord> {
        self.pane(side).get(index)
    }

    pub fn len(&self) -> usize {
        self.a.len()
    }

    /// True when row `index` is part of a diff block on either side.
    pub fn is_diff_row(&self, index: usize) -> bool {
        self.a.get(index).is_some_and(RowRecord::is_diff)
            || self.b.get(index).is_some_and(RowRecord::is_diff)
    }
}

/// Line-level change counts for the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiffStats {
    pub added: usize,
    pub deleted: usize,
    pub changed: usize,
}

impl DiffStats {
    pub fn is_identical(&self) -> bool {
        self.added == 0 && self.deleted == 0 && self.changed == 0
    }
}

impl fmt::Display for DiffStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "+{} -{} ~{}", self.added, self.deleted, self.changed)
    }
}
