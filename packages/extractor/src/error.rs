//! Error Types
//!
//! Structured errors for the fatal-class failures: unreadable catalogs and
//! conflicting source text for one key. Non-fatal conditions travel as
//! `Diagnostic` records instead.

use crate::catalog::MessageKey;
use crate::source::SourceReference;
use thiserror::Error;

/// A persisted catalog could not be parsed. Fatal for the owning locale's
/// merge (missing data cannot be guessed) but never aborts other locales.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}:{line}: {message}")]
pub struct CatalogFormatError {
    /// Path of the offending file, or a caller-supplied origin label.
    pub path: String,
    /// 1-based line of the offending record.
    pub line: usize,
    pub message: String,
}

impl CatalogFormatError {
    pub fn new(path: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        CatalogFormatError {
            path: path.into(),
            line,
            message: message.into(),
        }
    }
}

/// Two call sites agree on a key but disagree on its source text. This is a
/// build-time data error: no winner is picked, the key is excluded from the
/// merge and both sites are reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "conflicting source text for key `{key}`: {first_text:?} at {first} vs {second_text:?} at {second}"
)]
pub struct KeyConflict {
    pub key: MessageKey,
    pub first: SourceReference,
    pub first_text: String,
    pub second: SourceReference,
    pub second_text: String,
}
