//! Extraction Pipeline
//!
//! Drives a whole run: parallel extraction over independent translation
//! units, deterministic aggregation, then the per-locale merges. Units share
//! no mutable state, so extraction fans out over a worker pool; results are
//! re-sorted by file path before merging so the output is reproducible
//! regardless of scheduling. A failed unit never cancels its siblings; all
//! failures aggregate into the final report.

use crate::catalog::Catalog;
use crate::diagnostics::{Diagnostic, Severity};
use crate::extract::{extract_unit, ExtractionResult, MarkerConfig};
use crate::merge::{build_template, merge_locale};
use crate::source::SourceReference;
use crate::syntax::TranslationUnit;
use rayon::prelude::*;
use std::collections::BTreeSet;

/// Per-unit input: a parsed tree from the front-end, or the front-end's
/// failure to produce one. A failed unit contributes no entries, but its
/// previous entries survive the merge as stale.
#[derive(Debug, Clone)]
pub enum UnitInput {
    Parsed(TranslationUnit),
    Failed { file_path: String, message: String },
}

impl UnitInput {
    pub fn file_path(&self) -> &str {
        match self {
            UnitInput::Parsed(unit) => &unit.file_path,
            UnitInput::Failed { file_path, .. } => file_path,
        }
    }
}

/// Overall outcome of a run. Non-fatal skips never turn success into
/// failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Success,
    SuccessWithDiagnostics,
    Failure,
}

#[derive(Debug)]
pub struct PipelineResult {
    pub template: Catalog,
    pub locales: Vec<Catalog>,
    pub diagnostics: Vec<Diagnostic>,
    pub outcome: RunOutcome,
}

/// Extract all parsed units in parallel and return the results sorted by
/// file path, with each unit's diagnostics in traversal order.
pub fn extract_all(units: &[UnitInput], config: &MarkerConfig) -> Vec<ExtractionResult> {
    let mut results: Vec<ExtractionResult> = units
        .par_iter()
        .filter_map(|input| match input {
            UnitInput::Parsed(unit) => Some(extract_unit(unit, config)),
            UnitInput::Failed { .. } => None,
        })
        .collect();
    results.sort_by(|a, b| a.file_path.cmp(&b.file_path));
    results
}

/// Run the full pipeline: extraction, template update, locale merges.
pub fn run(
    units: &[UnitInput],
    config: &MarkerConfig,
    previous_template: &Catalog,
    previous_locales: &[Catalog],
) -> PipelineResult {
    let results = extract_all(units, config);

    let mut failed_units: Vec<(&str, &str)> = units
        .iter()
        .filter_map(|input| match input {
            UnitInput::Failed { file_path, message } => {
                Some((file_path.as_str(), message.as_str()))
            }
            UnitInput::Parsed(_) => None,
        })
        .collect();
    failed_units.sort();
    let failed_paths: BTreeSet<String> = failed_units
        .iter()
        .map(|(file_path, _)| (*file_path).to_string())
        .collect();

    merge_all(&results, &failed_units, &failed_paths, previous_template, previous_locales)
}

/// Merge already-collected extraction results. Split out of `run` so a
/// front end that persists extraction fragments can feed them in directly.
pub fn merge_all(
    results: &[ExtractionResult],
    failed_units: &[(&str, &str)],
    failed_paths: &BTreeSet<String>,
    previous_template: &Catalog,
    previous_locales: &[Catalog],
) -> PipelineResult {
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    for (file_path, message) in failed_units {
        diagnostics.push(Diagnostic::fatal(
            Some(SourceReference::new(*file_path, 0, 0)),
            format!("unit could not be parsed: {}", message),
        ));
    }
    for result in results {
        diagnostics.extend(result.diagnostics.iter().cloned());
    }

    let update = build_template(results, previous_template, failed_paths);
    for conflict in &update.conflicts {
        diagnostics.push(Diagnostic::fatal(
            Some(conflict.first.clone()),
            conflict.to_string(),
        ));
    }

    // Locale merges are independent; each owns exclusive write access to
    // its own catalog.
    let locales: Vec<Catalog> = previous_locales
        .par_iter()
        .map(|previous| merge_locale(&update.template, previous))
        .collect();

    let outcome = outcome_of(&diagnostics);
    PipelineResult {
        template: update.template,
        locales,
        diagnostics,
        outcome,
    }
}

/// Classify a finished run from its diagnostic stream.
pub fn outcome_of(diagnostics: &[Diagnostic]) -> RunOutcome {
    if diagnostics
        .iter()
        .any(|diagnostic| diagnostic.severity == Severity::Fatal)
    {
        RunOutcome::Failure
    } else if diagnostics.is_empty() {
        RunOutcome::Success
    } else {
        RunOutcome::SuccessWithDiagnostics
    }
}
