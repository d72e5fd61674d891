//! Line-addressable source text and document spans.
//!
//! Line terminators are normalized on the way in: every `\r\n` pair is
//! stored as a single `\n`, and every lone `\r` is rewritten to `\n`.
//! All lines keep their terminator, so the last character of every line
//! but (possibly) the final one is `\n`. Columns and absolute offsets
//! count characters of the normalized text, not bytes of the raw input.

use std::cmp::Ordering;
use std::fmt;

use uuid::Uuid;

/// Identifies the document a span or token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Create a fresh, random document id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID, e.g. one handed out by a document store.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error produced by the text model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextError {
    /// A line index past the end of the document.
    #[error("line {line} is out of range (document has {line_count} lines)")]
    LineOutOfRange { line: usize, line_count: usize },
    /// A span that does not address characters of the document.
    #[error("span {span} is out of range")]
    SpanOutOfRange { span: Span },
    /// A span whose end precedes its start.
    #[error(
        "span end ({end_line}, {end_col}) precedes its start ({start_line}, {start_col})"
    )]
    InvalidSpan {
        start_line: usize,
        start_col: usize,
        end_line: usize,
        end_col: usize,
    },
    /// Two spans from different documents were combined.
    #[error("unable to merge spans across distinct documents")]
    DocumentMismatch,
}

/// Inclusive `(start_line, start_col) ..= (end_line, end_col)` region of one
/// document. Lines and columns are 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    document: DocumentId,
    start_line: usize,
    start_col: usize,
    end_line: usize,
    end_col: usize,
}

impl Span {
    /// Create a span, checking that the end does not precede the start.
    pub const fn new(
        document: DocumentId,
        start_line: usize,
        start_col: usize,
        end_line: usize,
        end_col: usize,
    ) -> Result<Self, TextError> {
        if start_line > end_line || (start_line == end_line && start_col > end_col) {
            return Err(TextError::InvalidSpan {
                start_line,
                start_col,
                end_line,
                end_col,
            });
        }

        Ok(Self {
            document,
            start_line,
            start_col,
            end_line,
            end_col,
        })
    }

    /// The empty span at the very start of a document.
    #[must_use]
    pub const fn none(document: DocumentId) -> Self {
        Self::point(document, 0, 0)
    }

    /// A single-position span.
    #[must_use]
    pub const fn point(document: DocumentId, line: usize, col: usize) -> Self {
        Self {
            document,
            start_line: line,
            start_col: col,
            end_line: line,
            end_col: col,
        }
    }

    /// Span between two ordered positions. Callers guarantee `start <= end`.
    pub(crate) fn between(document: DocumentId, start: (usize, usize), end: (usize, usize)) -> Self {
        debug_assert!(start <= end, "span start {start:?} after end {end:?}");
        Self {
            document,
            start_line: start.0,
            start_col: start.1,
            end_line: end.0,
            end_col: end.1,
        }
    }

    #[must_use]
    pub const fn document(&self) -> DocumentId {
        self.document
    }

    #[must_use]
    pub const fn start_line(&self) -> usize {
        self.start_line
    }

    #[must_use]
    pub const fn start_col(&self) -> usize {
        self.start_col
    }

    #[must_use]
    pub const fn end_line(&self) -> usize {
        self.end_line
    }

    #[must_use]
    pub const fn end_col(&self) -> usize {
        self.end_col
    }

    /// `(line, col)` of the first character.
    #[must_use]
    pub const fn start(&self) -> (usize, usize) {
        (self.start_line, self.start_col)
    }

    /// `(line, col)` of the last character.
    #[must_use]
    pub const fn end(&self) -> (usize, usize) {
        (self.end_line, self.end_col)
    }

    #[must_use]
    pub const fn is_single_line(&self) -> bool {
        self.start_line == self.end_line
    }

    /// Smallest span covering both `self` and `other`.
    pub fn union(self, other: Self) -> Result<Self, TextError> {
        if self.document != other.document {
            return Err(TextError::DocumentMismatch);
        }

        let start = match self.start().cmp(&other.start()) {
            Ordering::Greater => other.start(),
            Ordering::Less | Ordering::Equal => self.start(),
        };
        let end = match self.end().cmp(&other.end()) {
            Ordering::Less => other.end(),
            Ordering::Greater | Ordering::Equal => self.end(),
        };

        Ok(Self::between(self.document, start, end))
    }

    /// Union of every span in `spans`, or `None` when there are none (or
    /// when they do not all belong to one document).
    pub fn cover<I>(spans: I) -> Option<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        spans
            .into_iter()
            .try_fold(None, |acc: Option<Self>, next| match acc {
                None => Ok(Some(next)),
                Some(prev) => prev.union(next).map(Some),
            })
            .ok()
            .flatten()
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.start_line, self.start_col, self.end_line, self.end_col
        )
    }
}

/// Source text stored as normalized lines.
#[derive(Debug, Clone)]
pub struct SourceText {
    id: DocumentId,
    lines: Vec<String>,
    chars: Vec<char>,
    line_starts: Vec<usize>,
    line_lengths: Vec<usize>,
}

impl SourceText {
    /// Normalize `contents` under a fresh document id.
    #[must_use]
    pub fn new(contents: &str) -> Self {
        Self::with_id(DocumentId::new(), contents)
    }

    /// Normalize `contents` under a caller-supplied document id.
    #[must_use]
    pub fn with_id(id: DocumentId, contents: &str) -> Self {
        let mut lines = Vec::new();
        let mut line = String::new();
        let mut chars = contents.chars().peekable();

        while let Some(ch) = chars.next() {
            match ch {
                '\n' => {
                    line.push('\n');
                    lines.push(std::mem::take(&mut line));
                }
                '\r' => {
                    line.push('\n');
                    lines.push(std::mem::take(&mut line));
                    if chars.peek() == Some(&'\n') {
                        chars.next();
                    }
                }
                _ => line.push(ch),
            }
        }

        if !line.is_empty() {
            lines.push(line);
        }

        let mut text = Self {
            id,
            lines,
            chars: Vec::new(),
            line_starts: Vec::new(),
            line_lengths: Vec::new(),
        };
        text.refresh();
        text
    }

    fn refresh(&mut self) {
        self.chars = self.lines.iter().flat_map(|line| line.chars()).collect();
        self.line_starts.clear();
        self.line_lengths.clear();

        let mut start = 0;
        for line in &self.lines {
            let len = line.chars().count();
            self.line_starts.push(start);
            self.line_lengths.push(len);
            start += len;
        }
    }

    #[must_use]
    pub const fn id(&self) -> DocumentId {
        self.id
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Number of characters in the normalized text.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// The whole normalized text.
    #[must_use]
    pub fn contents(&self) -> String {
        self.lines.concat()
    }

    /// Text of one line, including its terminator.
    pub fn line(&self, line: usize) -> Result<&str, TextError> {
        self.lines
            .get(line)
            .map(String::as_str)
            .ok_or(TextError::LineOutOfRange {
                line,
                line_count: self.line_count(),
            })
    }

    /// Length of one line in characters, including its terminator.
    pub fn line_len(&self, line: usize) -> Result<usize, TextError> {
        self.line_lengths
            .get(line)
            .copied()
            .ok_or(TextError::LineOutOfRange {
                line,
                line_count: self.line_count(),
            })
    }

    /// Absolute offset of `(line, col)`: the summed length of every
    /// preceding line plus `col`.
    #[must_use]
    pub fn offset(&self, line: usize, col: usize) -> usize {
        let start = self
            .line_starts
            .get(line)
            .copied()
            .unwrap_or_else(|| self.len());
        start + col
    }

    /// `(line, col)` of an absolute offset. Offsets past the end are
    /// reported on the last line.
    #[must_use]
    pub fn locate(&self, offset: usize) -> (usize, usize) {
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let start = self.line_starts.get(line).copied().unwrap_or(0);
        (line, offset - start)
    }

    /// Character at an absolute offset.
    #[must_use]
    pub fn char_at(&self, offset: usize) -> Option<char> {
        self.chars.get(offset).copied()
    }

    /// Character at `(line, col)`.
    #[must_use]
    pub fn char_at_line(&self, line: usize, col: usize) -> Option<char> {
        let len = self.line_lengths.get(line)?;
        if col >= *len {
            return None;
        }
        self.char_at(self.offset(line, col))
    }

    /// `len` characters starting at `offset`, clamped to the text.
    #[must_use]
    pub fn slice(&self, offset: usize, len: usize) -> String {
        let start = offset.min(self.len());
        let end = offset.saturating_add(len).min(self.len());
        self.chars[start..end].iter().collect()
    }

    /// Text covered by `span`, both ends inclusive.
    pub fn substring(&self, span: Span) -> Result<String, TextError> {
        self.check_span(span)?;

        let from = self.offset(span.start_line(), span.start_col());
        let to = self.offset(span.end_line(), span.end_col());
        Ok(self.slice(from, to - from + 1))
    }

    /// Both ends of `span` must name a character of this text.
    fn check_span(&self, span: Span) -> Result<(), TextError> {
        if span.document() != self.id {
            return Err(TextError::DocumentMismatch);
        }

        let out_of_range = || TextError::SpanOutOfRange { span };
        let start_len = self
            .line_lengths
            .get(span.start_line())
            .copied()
            .ok_or_else(out_of_range)?;
        let end_len = self
            .line_lengths
            .get(span.end_line())
            .copied()
            .ok_or_else(out_of_range)?;
        if span.start_col() >= start_len || span.end_col() >= end_len {
            return Err(out_of_range());
        }
        Ok(())
    }

    /// Delete one line.
    pub fn remove_line(&mut self, line: usize) -> Result<(), TextError> {
        if line >= self.line_count() {
            return Err(TextError::LineOutOfRange {
                line,
                line_count: self.line_count(),
            });
        }

        self.lines.remove(line);
        self.refresh();
        Ok(())
    }

    /// Delete the characters covered by `span`. A multi-line delete joins
    /// the remainder of the last line onto the first, and every line left
    /// empty by the delete is removed.
    pub fn remove_span(&mut self, span: Span) -> Result<(), TextError> {
        self.check_span(span)?;

        let (first, last) = (span.start_line(), span.end_line());

        if first == last {
            let kept = remove_chars(&self.lines[first], span.start_col(), span.end_col() + 1);
            self.lines[first] = kept;
            if self.lines[first].is_empty() {
                self.lines.remove(first);
            }
            self.refresh();
            return Ok(());
        }

        let head: String = self.lines[first].chars().take(span.start_col()).collect();
        let tail: String = self.lines[last].chars().skip(span.end_col() + 1).collect();
        for line in &mut self.lines[first + 1..last] {
            line.clear();
        }

        if head.is_empty() {
            self.lines[first] = head;
            self.lines[last] = tail;
        } else {
            self.lines[first] = head + &tail;
            self.lines[last].clear();
        }

        let mut index = first;
        let mut remaining = last - first + 1;
        while remaining > 0 {
            if self.lines[index].is_empty() {
                self.lines.remove(index);
            } else {
                index += 1;
            }
            remaining -= 1;
        }

        self.refresh();
        Ok(())
    }
}

fn remove_chars(line: &str, from: usize, to: usize) -> String {
    line.chars()
        .enumerate()
        .filter(|(index, _)| *index < from || *index >= to)
        .map(|(_, ch)| ch)
        .collect()
}
