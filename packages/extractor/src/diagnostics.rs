//! Diagnostics
//!
//! Ordered records emitted for skipped extractions, parse failures and merge
//! conflicts. Consumed by an external reporting layer; the core only
//! collects, it never prints.

use crate::source::SourceReference;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    /// Non-fatal, entry excluded, extraction continues (e.g. a computed
    /// message argument).
    Warning,
    /// Non-fatal but indicates broken source (e.g. a malformed marker call).
    Error,
    /// Fatal-class: fails the whole run (parse failures, key conflicts,
    /// unreadable catalogs).
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
            Severity::Fatal => write!(f, "fatal"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub reference: Option<SourceReference>,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(reference: Option<SourceReference>, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            reference,
            message: message.into(),
        }
    }

    pub fn error(reference: Option<SourceReference>, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Error,
            reference,
            message: message.into(),
        }
    }

    pub fn fatal(reference: Option<SourceReference>, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Fatal,
            reference,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reference {
            Some(reference) => write!(f, "{}: {}: {}", self.severity, reference, self.message),
            None => write!(f, "{}: {}", self.severity, self.message),
        }
    }
}
