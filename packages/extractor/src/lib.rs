//! i18n Extractor
//!
//! Extraction and catalog-merge core for translatable messages.
//!
//! The crate consumes parsed translation units (a syntax tree produced by an
//! external front-end), locates translation call sites, and reconciles the
//! extracted messages against previously persisted catalogs: one per locale,
//! plus a distinguished template catalog holding only source text. Catalogs
//! are persisted in a PO-style text format with key-sorted records so diffs
//! stay stable under version control.

pub mod catalog;
pub mod diagnostics;
pub mod digest;
pub mod error;
pub mod extract;
pub mod merge;
pub mod pipeline;
pub mod serializers;
pub mod source;
pub mod syntax;

pub use catalog::{Catalog, CatalogEntry, EntryStatus, MessageKey};
pub use diagnostics::{Diagnostic, Severity};
pub use error::{CatalogFormatError, KeyConflict};
pub use extract::{extract_unit, ExtractionResult, MarkerConfig, MarkerSpec};
pub use pipeline::{RunOutcome, UnitInput};
pub use source::SourceReference;
