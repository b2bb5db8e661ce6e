//! Merge Engine
//!
//! Combines extracted entries across translation units and reconciles them
//! against previously persisted catalogs. The engine owns all catalog
//! mutation: it builds a fresh template from the union of extraction
//! results, diffs it against the previous template, then propagates the
//! template's key set into each locale catalog. A translator-supplied
//! string is never discarded; only extraction-sourced text and statuses
//! change.

use crate::catalog::{Catalog, CatalogEntry, EntryStatus, MessageKey};
use crate::error::KeyConflict;
use crate::extract::ExtractionResult;
use crate::source::SourceReference;
use indexmap::IndexMap;
use smallvec::SmallVec;
use std::collections::{BTreeSet, HashSet};

/// Output of the template pass: the updated template plus any key conflicts
/// found while unioning the extraction results. Conflicted keys are excluded
/// from the update; their previous entries carry forward untouched.
#[derive(Debug)]
pub struct TemplateUpdate {
    pub template: Catalog,
    pub conflicts: Vec<KeyConflict>,
}

struct PendingEntry {
    text: SmallVec<[String; 2]>,
    first: SourceReference,
    references: BTreeSet<SourceReference>,
}

/// Build the updated template catalog from this run's extraction results.
///
/// `failed_units` names files whose front-end parse failed: keys referenced
/// only from those files are preserved as stale instead of being obsoleted,
/// since "could not parse" never means "has no messages".
pub fn build_template(
    results: &[ExtractionResult],
    previous: &Catalog,
    failed_units: &BTreeSet<String>,
) -> TemplateUpdate {
    // Deterministic ordering for "first reference wins": an explicit sort by
    // (file, line, col), never traversal or scheduling order.
    let mut extracted: Vec<_> = results.iter().flat_map(|r| r.messages.iter()).collect();
    extracted.sort_by(|a, b| a.reference.cmp(&b.reference));

    let mut pending: IndexMap<MessageKey, PendingEntry> = IndexMap::new();
    let mut conflicts: Vec<KeyConflict> = Vec::new();
    let mut poisoned: HashSet<MessageKey> = HashSet::new();

    for message in extracted {
        if poisoned.contains(&message.key) {
            continue;
        }
        match pending.get_mut(&message.key) {
            None => {
                pending.insert(
                    message.key.clone(),
                    PendingEntry {
                        text: message.text.clone(),
                        first: message.reference.clone(),
                        references: BTreeSet::from([message.reference.clone()]),
                    },
                );
            }
            Some(existing) => {
                if existing.text != message.text {
                    conflicts.push(KeyConflict {
                        key: message.key.clone(),
                        first: existing.first.clone(),
                        first_text: existing.text.join(" / "),
                        second: message.reference.clone(),
                        second_text: message.text.join(" / "),
                    });
                    poisoned.insert(message.key.clone());
                    pending.shift_remove(&message.key);
                } else {
                    existing.references.insert(message.reference.clone());
                }
            }
        }
    }

    let mut template = Catalog::template();

    for (key, entry) in pending {
        let mut fresh = CatalogEntry::new(key, entry.text, entry.references);
        if let Some(prev) = previous.get(&fresh.key) {
            if prev.source_hash == fresh.source_hash {
                fresh.previous_source = prev.previous_source.clone();
                fresh.status = match prev.status {
                    EntryStatus::Obsolete => EntryStatus::New,
                    status => status,
                };
            } else {
                // Source text changed: remember what it was, for review.
                fresh.previous_source = Some(prev.singular_source().to_string());
            }
        }
        template.insert(fresh);
    }

    // Keys present before but absent from this run's extraction.
    for prev in previous.iter() {
        if template.contains_key(&prev.key) {
            continue;
        }
        if poisoned.contains(&prev.key) {
            // Conflicted key: leave the previous entry exactly as it was.
            template.insert(prev.clone());
        } else if prev
            .references
            .iter()
            .any(|r| failed_units.contains(&r.file))
        {
            // Referenced from a unit that failed to parse: stale, not gone.
            template.insert(prev.clone());
        } else {
            let mut obsolete = prev.clone();
            obsolete.status = EntryStatus::Obsolete;
            template.insert(obsolete);
        }
    }

    TemplateUpdate {
        template,
        conflicts,
    }
}

/// Propagate the template's key set into one locale catalog. The result owns
/// its locale exclusively; merges for different locales are independent.
pub fn merge_locale(template: &Catalog, previous: &Catalog) -> Catalog {
    let mut merged = Catalog::new(previous.locale.clone());

    for tentry in template.iter() {
        let entry = match previous.get(&tentry.key) {
            None => {
                let mut fresh = tentry.clone();
                fresh.translation.clear();
                fresh.previous_source = None;
                fresh.status = match tentry.status {
                    EntryStatus::Obsolete => EntryStatus::Obsolete,
                    _ => EntryStatus::New,
                };
                fresh
            }
            Some(prev) => merge_entry(tentry, prev),
        };
        merged.insert(entry);
    }

    // A key known to the locale but missing from the template never
    // disappears; it is retained as obsolete.
    for prev in previous.iter() {
        if !merged.contains_key(&prev.key) {
            let mut obsolete = prev.clone();
            obsolete.status = EntryStatus::Obsolete;
            merged.insert(obsolete);
        }
    }

    merged
}

fn merge_entry(tentry: &CatalogEntry, prev: &CatalogEntry) -> CatalogEntry {
    if tentry.status == EntryStatus::Obsolete {
        // Keep the translator's work intact for possible resurrection.
        let mut entry = prev.clone();
        entry.status = EntryStatus::Obsolete;
        return entry;
    }

    let mut entry = tentry.clone();
    entry.translation = prev.translation.clone();

    if prev.source_hash == tentry.source_hash {
        entry.previous_source = prev.previous_source.clone();
        entry.status = match prev.status {
            // Resurrected: the key reappeared with unchanged source text.
            // A pending review suggestion means the translation never caught
            // up with the text, so it stays fuzzy.
            EntryStatus::Obsolete => {
                if !prev.is_translated() {
                    EntryStatus::New
                } else if prev.previous_source.is_some() {
                    EntryStatus::Fuzzy
                } else {
                    EntryStatus::Translated
                }
            }
            status => status,
        };
    } else {
        entry.previous_source = Some(prev.singular_source().to_string());
        entry.status = if prev.is_translated() && prev.status != EntryStatus::New {
            EntryStatus::Fuzzy
        } else {
            EntryStatus::New
        };
    }

    entry
}
