//! Source References
//!
//! Positions of message call sites inside translation units.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Line and column indexes are 1 based
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceReference {
    pub file: String,
    pub line: u32,
    pub col: u32,
}

impl SourceReference {
    pub fn new(file: impl Into<String>, line: u32, col: u32) -> Self {
        SourceReference {
            file: file.into(),
            line,
            col,
        }
    }
}

impl fmt::Display for SourceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.col)
    }
}

/// A position inside a single translation unit. The file is implied by the
/// owning unit; pairing a span with the unit path yields a `SourceReference`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub line: u32,
    pub col: u32,
}

impl Span {
    pub fn new(line: u32, col: u32) -> Self {
        Span { line, col }
    }

    pub fn reference(&self, file: &str) -> SourceReference {
        SourceReference::new(file, self.line, self.col)
    }
}
