//! Catalog Model
//!
//! In-memory representation of translatable message entries and locale
//! catalogs. A catalog maps `MessageKey` to `CatalogEntry`, keys unique, and
//! represents one locale's full message set (or the template when no locale
//! is attached). Catalogs are constructed empty or loaded from disk, mutated
//! only by the merge engine and persisted by the writer.

use crate::digest;
use crate::source::SourceReference;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::btree_map;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Upper bound on plural forms across the supported locales.
pub const MAX_PLURAL_FORMS: u8 = 6;

/// Canonical identity of a translatable unit. Ordering is lexicographic by
/// context, then id, then plural form count, which is also the order records
/// are persisted in.
///
/// `context: None` means the call site carried no context argument; it is
/// distinct from an explicit empty context only when the marker
/// configuration asks for that (see `MarkerConfig::distinct_empty_context`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageKey {
    pub context: Option<String>,
    pub id: String,
    pub plural_forms: u8,
}

impl MessageKey {
    pub fn new(context: Option<String>, id: impl Into<String>, plural_forms: u8) -> Self {
        MessageKey {
            context,
            id: id.into(),
            plural_forms,
        }
    }

    pub fn singular(id: impl Into<String>) -> Self {
        MessageKey::new(None, id, 1)
    }

    pub fn with_context(context: impl Into<String>, id: impl Into<String>) -> Self {
        MessageKey::new(Some(context.into()), id, 1)
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context {
            Some(context) => write!(f, "{}|{}", context, self.id),
            None => write!(f, "{}", self.id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryStatus {
    /// Extracted but not yet translated.
    New,
    /// Carries a translation matching the current source text.
    Translated,
    /// Translation may be stale: the source text changed since it was made.
    Fuzzy,
    /// No longer referenced by source; retained for possible resurrection.
    Obsolete,
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryStatus::New => write!(f, "new"),
            EntryStatus::Translated => write!(f, "translated"),
            EntryStatus::Fuzzy => write!(f, "fuzzy"),
            EntryStatus::Obsolete => write!(f, "obsolete"),
        }
    }
}

/// One message record, owned by exactly one catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub key: MessageKey,
    /// Untranslated text, one form per plural variant (singular first).
    pub source_text: SmallVec<[String; 2]>,
    /// The owning locale's translation forms; empty when untranslated.
    /// A template catalog never carries translations.
    pub translation: SmallVec<[String; 2]>,
    /// Singular source text as it was when the current translation was made;
    /// kept as a suggestion while the entry is fuzzy.
    pub previous_source: Option<String>,
    pub references: BTreeSet<SourceReference>,
    pub status: EntryStatus,
    /// Staleness hash over `source_text`; recomputed, never persisted.
    pub source_hash: u64,
}

impl CatalogEntry {
    pub fn new(
        key: MessageKey,
        source_text: SmallVec<[String; 2]>,
        references: BTreeSet<SourceReference>,
    ) -> Self {
        let source_hash = digest::source_hash(&source_text);
        CatalogEntry {
            key,
            source_text,
            translation: SmallVec::new(),
            previous_source: None,
            references,
            status: EntryStatus::New,
            source_hash,
        }
    }

    /// Replace the source text, keeping the hash in sync.
    pub fn set_source_text(&mut self, source_text: SmallVec<[String; 2]>) {
        self.source_hash = digest::source_hash(&source_text);
        self.source_text = source_text;
    }

    pub fn is_translated(&self) -> bool {
        self.translation.iter().any(|form| !form.is_empty())
    }

    pub fn singular_source(&self) -> &str {
        self.source_text.first().map(String::as_str).unwrap_or("")
    }
}

/// The full message set for one locale, or the template when `locale` is
/// `None`. Never mutated concurrently by two writers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub locale: Option<String>,
    entries: BTreeMap<MessageKey, CatalogEntry>,
}

impl Catalog {
    pub fn new(locale: Option<String>) -> Self {
        Catalog {
            locale,
            entries: BTreeMap::new(),
        }
    }

    pub fn template() -> Self {
        Catalog::new(None)
    }

    pub fn for_locale(locale: impl Into<String>) -> Self {
        Catalog::new(Some(locale.into()))
    }

    pub fn is_template(&self) -> bool {
        self.locale.is_none()
    }

    /// Insert an entry under its own key. Replaces any previous entry with
    /// the same key, which keeps the no-duplicate-keys invariant by
    /// construction.
    pub fn insert(&mut self, entry: CatalogEntry) -> Option<CatalogEntry> {
        self.entries.insert(entry.key.clone(), entry)
    }

    pub fn get(&self, key: &MessageKey) -> Option<&CatalogEntry> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &MessageKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Entries in key order.
    pub fn iter(&self) -> btree_map::Values<'_, MessageKey, CatalogEntry> {
        self.entries.values()
    }

    pub fn keys(&self) -> btree_map::Keys<'_, MessageKey, CatalogEntry> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
