//! Source location records.
//!
//! The core never reads source text or owns a lexer; it only ever carries
//! the `Location` record handed to it by the (out-of-scope) parser, per
//! spec section 6: `{file, start(line,col), end(line,col)}`.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

/// A 1-based (line, column) position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub line: u32,
    pub col: u32,
}

impl Position {
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// A source location: a file name plus a start/end position pair.
///
/// This is the only location shape the core understands; it carries no
/// byte offsets because the core never re-reads source text (precise
/// sub-range diagnostics beyond this record are explicitly out of scope,
/// spec section 1).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    pub file: Arc<str>,
    pub start: Position,
    pub end: Position,
}

impl Location {
    pub fn new(file: impl Into<Arc<str>>, start: Position, end: Position) -> Self {
        Self { file: file.into(), start, end }
    }

    /// A location used for synthesized nodes that have no source origin
    /// (builtin trait impls, compiler-introduced type variables).
    pub fn synthetic() -> Self {
        Self {
            file: Arc::from("<builtin>"),
            start: Position::new(0, 0),
            end: Position::new(0, 0),
        }
    }

    /// Merge two locations into one spanning both; the earlier start and
    /// later end win. Both locations must share a file (debug-asserted).
    pub fn merge(&self, other: &Location) -> Location {
        debug_assert_eq!(
            self.file, other.file,
            "cannot merge locations from different files"
        );
        let start = self.start.min(other.start);
        let end = self.end.max(other.end);
        Location { file: self.file.clone(), start, end }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.file, self.start, self.end)
    }
}
