//! Position and document model underlying all offset math.
//!
//! ## Units
//! - `line` and `character` are 0-based.
//! - `character` and `absolute_offset` are UTF-8 **byte** offsets (from line start and document start). This keeps
//!   token spans directly sliceable out of the document text.
//! - Lines are delimited by `\n`. A preceding `\r` is part of the line's text.

use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors for out-of-bounds document queries.
///
/// These indicate a caller contract violation (asking about text that does not exist), never malformed input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("offset {offset} is out of bounds. Document length was {length}")]
    OffsetOutOfRange { offset: usize, length: usize },

    #[error("position {position} is out of range. Line [{line}] only has length {length}")]
    CharacterOutOfRange { position: Position, line: usize, length: usize },

    #[error("position {position} is out of range. Document only has {line_count} lines")]
    LineOutOfRange { position: Position, line_count: usize },

    #[error("line {line} is out of range. Document only has {line_count} lines")]
    LineIndexOutOfRange { line: usize, line_count: usize },

    #[error("offset {offset} does not fall on a character boundary")]
    NotCharBoundary { offset: usize },

    #[error("range end {end} precedes range start {start}")]
    InvertedRange { start: Position, end: Position },
}

// ============================================================================
// Position
// ============================================================================

/// A line/character position plus its absolute offset from document start.
///
/// ## Notes
/// - `Position` is a `Copy` value. Tokens store **snapshots**; the tokenizer owns a single working cursor and mutates
///   it in place with [`Position::next`], [`Position::advance`], and [`Position::next_line`]. Nothing else ever
///   observes the working cursor, so there is no hidden aliasing between tokens.
/// - Ordering is lexicographic by `(line, character)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub character: usize,
    pub absolute_offset: usize,
}

impl Position {
    pub fn new(line: usize, character: usize, absolute_offset: usize) -> Self {
        Self {
            line,
            character,
            absolute_offset,
        }
    }

    /// Move the position by one byte.
    pub fn next(&mut self) {
        self.character += 1;
        self.absolute_offset += 1;
    }

    /// Move the position by `amount` bytes within the current line.
    pub fn advance(&mut self, amount: usize) {
        self.character += amount;
        self.absolute_offset += amount;
    }

    /// Move to the start of the next line.
    ///
    /// The absolute offset is left untouched: the caller accounts for the line break bytes it consumed.
    pub fn next_line(&mut self) {
        self.line += 1;
        self.character = 0;
    }

    /// Overwrite this position in place.
    pub fn set_value(&mut self, other: &Position) {
        *self = *other;
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.line, self.character).cmp(&(other.line, other.character))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}:C{}", self.line + 1, self.character + 1)
    }
}

// ============================================================================
// Ranges and locations
// ============================================================================

/// A half-open `[start, end)` span between two positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DocumentRange {
    pub start: Position,
    pub end: Position,
}

impl DocumentRange {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn overlaps(&self, other: &DocumentRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Whether an absolute offset falls inside the range (both ends inclusive).
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start.absolute_offset && offset <= self.end.absolute_offset
    }

    /// Smallest range covering both.
    pub fn merge(self, other: DocumentRange) -> DocumentRange {
        DocumentRange {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for DocumentRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// A range inside a specific document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub path: PathBuf,
    pub range: DocumentRange,
}

impl Location {
    pub fn new(path: impl Into<PathBuf>, range: DocumentRange) -> Self {
        Self {
            path: path.into(),
            range,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.path.display(),
            self.range.start.line + 1,
            self.range.start.character + 1
        )
    }
}

// ============================================================================
// TextDocument
// ============================================================================

/// A single line of a document, without its `\n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    pub text: &'a str,
}

/// An in-memory source document with line/offset queries.
#[derive(Debug, Clone)]
pub struct TextDocument {
    path: PathBuf,
    text: String,
    version: i32,
    /// Byte offset of the first character of every line; never empty.
    line_starts: Vec<usize>,
}

impl TextDocument {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let text = text.into();
        let line_starts = compute_line_starts(&text);
        Self {
            path: path.into(),
            text,
            version: 0,
            line_starts,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    /// Replace the whole text and bump the version.
    pub fn update(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.line_starts = compute_line_starts(&self.text);
        self.version += 1;
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Text of line `line`, excluding its line break.
    pub fn line_at(&self, line: usize) -> Result<Line<'_>, DocumentError> {
        let Some(&start) = self.line_starts.get(line) else {
            return Err(DocumentError::LineIndexOutOfRange {
                line,
                line_count: self.line_count(),
            });
        };
        Ok(Line {
            text: &self.text[start..start + self.line_length(line)],
        })
    }

    fn line_length(&self, line: usize) -> usize {
        let start = self.line_starts[line];
        match self.line_starts.get(line + 1) {
            // exclude the '\n' that starts the next line
            Some(&next) => next - 1 - start,
            None => self.text.len() - start,
        }
    }

    /// The whole text, or the text covered by `range`.
    pub fn get_text(&self, range: Option<&DocumentRange>) -> Result<&str, DocumentError> {
        let Some(range) = range else {
            return Ok(&self.text);
        };
        let start = self.offset_at(&range.start)?;
        let end = self.offset_at(&range.end)?;
        if end < start {
            return Err(DocumentError::InvertedRange {
                start: range.start,
                end: range.end,
            });
        }
        for offset in [start, end] {
            if !self.text.is_char_boundary(offset) {
                return Err(DocumentError::NotCharBoundary { offset });
            }
        }
        Ok(&self.text[start..end])
    }

    /// Expand around `position` to the surrounding run of non-whitespace characters.
    ///
    /// The line and character are clamped into the document first. Returns `None` when the expansion is empty,
    /// i.e. the position sits between two whitespace characters (or on an empty line).
    pub fn get_word_range_at_position(&self, position: &Position) -> Option<DocumentRange> {
        let line = position.line.min(self.line_count() - 1);
        let line_start = self.line_starts[line];
        let line_text = self.line_at(line).ok()?.text;

        let mut character = position.character.min(line_text.len());
        while !line_text.is_char_boundary(character) {
            character -= 1;
        }

        let mut start = character;
        while let Some(c) = line_text[..start].chars().next_back() {
            if c.is_whitespace() {
                break;
            }
            start -= c.len_utf8();
        }

        let mut end = character;
        while let Some(c) = line_text[end..].chars().next() {
            if c.is_whitespace() {
                break;
            }
            end += c.len_utf8();
        }

        if start == end {
            return None;
        }

        Some(DocumentRange::new(
            Position::new(line, start, line_start + start),
            Position::new(line, end, line_start + end),
        ))
    }

    /// Convert an absolute offset into a position.
    ///
    /// An offset pointing at a line break maps to the end of that line. `offset == len()` is valid and maps to the
    /// end of the last line.
    pub fn position_at(&self, offset: usize) -> Result<Position, DocumentError> {
        if offset > self.text.len() {
            return Err(DocumentError::OffsetOutOfRange {
                offset,
                length: self.text.len(),
            });
        }
        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        Ok(Position::new(line, offset - self.line_starts[line], offset))
    }

    /// Convert a line/character position into an absolute offset.
    ///
    /// Only `line` and `character` are consulted; `absolute_offset` is recomputed.
    pub fn offset_at(&self, position: &Position) -> Result<usize, DocumentError> {
        if position.line >= self.line_count() {
            return Err(DocumentError::LineOutOfRange {
                position: *position,
                line_count: self.line_count(),
            });
        }
        let length = self.line_length(position.line);
        if position.character > length {
            return Err(DocumentError::CharacterOutOfRange {
                position: *position,
                line: position.line,
                length,
            });
        }
        Ok(self.line_starts[position.line] + position.character)
    }
}

fn compute_line_starts(text: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(text.match_indices('\n').map(|(i, _)| i + 1))
        .collect()
}
