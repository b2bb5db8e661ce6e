//! PO Serializer
//!
//! PO-style catalog format. One record per entry, records sorted by key for
//! reproducible diffs. Because message keys are symbolic ids rather than the
//! source strings themselves, the untranslated text lives in `msgsrc`
//! directives (`msgsrc[N]` per plural form) alongside the standard
//! `msgctxt`/`msgid`/`msgstr` keywords:
//!
//! ```text
//! #: src/greet.c:3:1
//! msgctxt "menu"
//! msgid "greeting"
//! msgsrc "Hello"
//! msgstr "Bonjour"
//! ```
//!
//! Fuzzy entries carry the `#, fuzzy` flag and their pre-change source text
//! in a `#| msgsrc` comment; obsolete entries have their directive lines
//! prefixed with `#~ `. A header record (`msgid ""`) holds the locale tag.

use crate::catalog::{Catalog, CatalogEntry, EntryStatus, MessageKey, MAX_PLURAL_FORMS};
use crate::error::CatalogFormatError;
use crate::source::SourceReference;
use lazy_static::lazy_static;
use regex::Regex;
use smallvec::SmallVec;
use std::collections::BTreeSet;
use std::fmt::Write as _;

lazy_static! {
    static ref INDEXED_FORM: Regex = Regex::new(r"^msg(src|str)\[(\d+)\]\s*(.*)$").unwrap();
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Serialize a catalog. Entries are emitted key-sorted; calling this twice
/// on the same catalog yields byte-identical output.
pub fn write_catalog(catalog: &Catalog) -> String {
    let mut out = String::new();

    // Header record; the locale tag is what the reader restores it from.
    let mut header = String::from("Content-Type: text/plain; charset=UTF-8\n");
    if let Some(locale) = &catalog.locale {
        let _ = writeln!(header, "Language: {}", locale);
    }
    out.push_str("msgid \"\"\n");
    let _ = writeln!(out, "msgstr {}", quoted(&header));

    for entry in catalog.iter() {
        out.push('\n');
        write_entry(&mut out, entry);
    }

    out
}

fn write_entry(out: &mut String, entry: &CatalogEntry) {
    for reference in &entry.references {
        let _ = writeln!(out, "#: {}", reference);
    }
    if entry.status == EntryStatus::Fuzzy {
        out.push_str("#, fuzzy\n");
    }
    if let Some(previous) = &entry.previous_source {
        let _ = writeln!(out, "#| msgsrc {}", quoted(previous));
    }

    // gettext convention: obsolete entries keep their record body behind
    // a `#~ ` prefix so translators can resurrect them.
    let prefix = if entry.status == EntryStatus::Obsolete {
        "#~ "
    } else {
        ""
    };

    if let Some(context) = &entry.key.context {
        let _ = writeln!(out, "{}msgctxt {}", prefix, quoted(context));
    }
    let _ = writeln!(out, "{}msgid {}", prefix, quoted(&entry.key.id));

    if entry.key.plural_forms == 1 {
        let _ = writeln!(out, "{}msgsrc {}", prefix, quoted(entry.singular_source()));
    } else {
        for (index, form) in entry.source_text.iter().enumerate() {
            let _ = writeln!(out, "{}msgsrc[{}] {}", prefix, index, quoted(form));
        }
    }

    let slots = (entry.key.plural_forms as usize).max(entry.translation.len());
    if entry.key.plural_forms == 1 && entry.translation.len() <= 1 {
        let form = entry.translation.first().map(String::as_str).unwrap_or("");
        let _ = writeln!(out, "{}msgstr {}", prefix, quoted(form));
    } else {
        for index in 0..slots {
            let form = entry.translation.get(index).map(String::as_str).unwrap_or("");
            let _ = writeln!(out, "{}msgstr[{}] {}", prefix, index, quoted(form));
        }
    }
}

fn quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                let _ = write!(out, "\\{:03o}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Parse a persisted catalog. `origin` names the input (usually its path)
/// in error reports. A malformed record is an error, never a silent skip.
pub fn read_catalog(input: &str, origin: &str) -> Result<Catalog, CatalogFormatError> {
    let mut reader = Reader {
        origin,
        catalog: Catalog::new(None),
        record: None,
    };

    for (index, raw_line) in input.lines().enumerate() {
        let line_no = index + 1;
        reader.line(raw_line.trim_end(), line_no)?;
    }
    reader.finish()?;

    Ok(reader.catalog)
}

/// Which directive a continuation line appends to.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Field {
    Context,
    Id,
    Previous,
    Source(usize),
    Translation(usize),
}

struct Record {
    start_line: usize,
    references: BTreeSet<SourceReference>,
    fuzzy: bool,
    obsolete: bool,
    previous_source: Option<String>,
    context: Option<String>,
    id: Option<String>,
    sources: Vec<String>,
    translations: Vec<String>,
    last_field: Option<Field>,
}

impl Record {
    fn new(start_line: usize) -> Self {
        Record {
            start_line,
            references: BTreeSet::new(),
            fuzzy: false,
            obsolete: false,
            previous_source: None,
            context: None,
            id: None,
            sources: Vec::new(),
            translations: Vec::new(),
            last_field: None,
        }
    }
}

struct Reader<'a> {
    origin: &'a str,
    catalog: Catalog,
    record: Option<Record>,
}

impl Reader<'_> {
    fn err(&self, line: usize, message: impl Into<String>) -> CatalogFormatError {
        CatalogFormatError::new(self.origin, line, message)
    }

    fn record(&mut self, line_no: usize) -> &mut Record {
        self.record.get_or_insert_with(|| Record::new(line_no))
    }

    fn line(&mut self, line: &str, line_no: usize) -> Result<(), CatalogFormatError> {
        if line.trim().is_empty() {
            return self.flush();
        }

        if let Some(rest) = line.strip_prefix("#~") {
            self.record(line_no).obsolete = true;
            let rest = rest.trim_start();
            if rest.is_empty() {
                return Ok(());
            }
            return self.directive(rest, line_no);
        }

        if let Some(rest) = line.strip_prefix("#:") {
            for token in rest.split_whitespace() {
                let reference = parse_reference(token)
                    .ok_or_else(|| self.err(line_no, format!("malformed reference `{}`", token)))?;
                self.record(line_no).references.insert(reference);
            }
            return Ok(());
        }

        if let Some(rest) = line.strip_prefix("#,") {
            if rest.split(',').any(|flag| flag.trim() == "fuzzy") {
                self.record(line_no).fuzzy = true;
            }
            return Ok(());
        }

        if let Some(rest) = line.strip_prefix("#|") {
            let rest = rest.trim_start();
            let value = rest
                .strip_prefix("msgsrc")
                .or_else(|| rest.strip_prefix("msgid"))
                .ok_or_else(|| self.err(line_no, "expected `#| msgsrc \"...\"`"))?;
            let text = self.quoted_value(value, line_no)?;
            let record = self.record(line_no);
            record.previous_source = Some(text);
            record.last_field = Some(Field::Previous);
            return Ok(());
        }

        if line.starts_with('#') {
            // Translator or extracted comment; carried by humans, not us.
            return Ok(());
        }

        self.directive(line, line_no)
    }

    fn directive(&mut self, line: &str, line_no: usize) -> Result<(), CatalogFormatError> {
        if line.starts_with('"') {
            // gettext-style string continuation: append to the last field.
            let text = self.parse_quoted(line, line_no)?;
            let Some(field) = self.record(line_no).last_field else {
                return Err(self.err(line_no, "continuation line without a preceding field"));
            };
            let record = self.record(line_no);
            match field {
                Field::Context => record.context.get_or_insert_with(String::new).push_str(&text),
                Field::Id => record.id.get_or_insert_with(String::new).push_str(&text),
                Field::Previous => record
                    .previous_source
                    .get_or_insert_with(String::new)
                    .push_str(&text),
                Field::Source(index) => record.sources[index].push_str(&text),
                Field::Translation(index) => record.translations[index].push_str(&text),
            }
            return Ok(());
        }

        if line.starts_with("msgid_plural") {
            return Err(self.err(line_no, "unsupported keyword `msgid_plural` (plural source text uses `msgsrc[N]`)"));
        }

        if let Some(captures) = INDEXED_FORM.captures(line) {
            let index: usize = captures[2]
                .parse()
                .map_err(|_| self.err(line_no, "malformed form index"))?;
            let text = self.quoted_value(&captures[3], line_no)?;
            let is_source = &captures[1] == "src";
            let record = self.record(line_no);
            let forms = if is_source {
                &mut record.sources
            } else {
                &mut record.translations
            };
            let expected = forms.len();
            if index != expected {
                return Err(self.err(
                    line_no,
                    format!("form index {} out of order (expected {})", index, expected),
                ));
            }
            forms.push(text);
            record.last_field = Some(if is_source {
                Field::Source(index)
            } else {
                Field::Translation(index)
            });
            return Ok(());
        }

        if let Some(rest) = line.strip_prefix("msgctxt") {
            let text = self.quoted_value(rest, line_no)?;
            let record = self.record(line_no);
            if record.context.is_some() {
                return Err(self.err(line_no, "duplicate msgctxt in record"));
            }
            record.context = Some(text);
            record.last_field = Some(Field::Context);
            return Ok(());
        }

        if let Some(rest) = line.strip_prefix("msgid") {
            let text = self.quoted_value(rest, line_no)?;
            let record = self.record(line_no);
            if record.id.is_some() {
                return Err(self.err(line_no, "duplicate msgid in record"));
            }
            record.id = Some(text);
            record.last_field = Some(Field::Id);
            return Ok(());
        }

        if let Some(rest) = line.strip_prefix("msgsrc") {
            let text = self.quoted_value(rest, line_no)?;
            let record = self.record(line_no);
            if !record.sources.is_empty() {
                return Err(self.err(line_no, "duplicate msgsrc in record"));
            }
            record.sources.push(text);
            record.last_field = Some(Field::Source(0));
            return Ok(());
        }

        if let Some(rest) = line.strip_prefix("msgstr") {
            let text = self.quoted_value(rest, line_no)?;
            let record = self.record(line_no);
            if !record.translations.is_empty() {
                return Err(self.err(line_no, "duplicate msgstr in record"));
            }
            record.translations.push(text);
            record.last_field = Some(Field::Translation(0));
            return Ok(());
        }

        Err(self.err(line_no, format!("unrecognized line `{}`", line)))
    }

    fn quoted_value(&mut self, rest: &str, line_no: usize) -> Result<String, CatalogFormatError> {
        self.parse_quoted(rest.trim(), line_no)
    }

    fn parse_quoted(&self, text: &str, line_no: usize) -> Result<String, CatalogFormatError> {
        let inner = text
            .strip_prefix('"')
            .and_then(|t| t.strip_suffix('"'))
            .ok_or_else(|| self.err(line_no, "expected a quoted string"))?;

        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                if c == '"' {
                    return Err(self.err(line_no, "unescaped quote inside string"));
                }
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('\\') => out.push('\\'),
                Some('"') => out.push('"'),
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some(d @ '0'..='7') => {
                    let mut value = d as u32 - '0' as u32;
                    let mut rest = chars.clone();
                    for _ in 0..2 {
                        match rest.clone().next() {
                            Some(d @ '0'..='7') => {
                                value = value * 8 + (d as u32 - '0' as u32);
                                rest.next();
                            }
                            _ => break,
                        }
                    }
                    chars = rest;
                    let c = char::from_u32(value)
                        .ok_or_else(|| self.err(line_no, "invalid octal escape"))?;
                    out.push(c);
                }
                Some(other) => {
                    return Err(self.err(line_no, format!("unknown escape `\\{}`", other)));
                }
                None => return Err(self.err(line_no, "dangling backslash")),
            }
        }
        Ok(out)
    }

    fn flush(&mut self) -> Result<(), CatalogFormatError> {
        let Some(record) = self.record.take() else {
            return Ok(());
        };
        let line = record.start_line;

        let Some(id) = record.id else {
            return Err(self.err(line, "record missing msgid"));
        };

        if id.is_empty() && record.context.is_none() && record.sources.is_empty() {
            // Header record: restore the locale tag.
            let header = record.translations.concat();
            if let Some(language) = header
                .lines()
                .find_map(|l| l.strip_prefix("Language:"))
            {
                let language = language.trim();
                if !language.is_empty() {
                    self.catalog.locale = Some(language.to_string());
                }
            }
            return Ok(());
        }

        if id.is_empty() {
            return Err(self.err(line, "record with empty msgid"));
        }
        if record.sources.is_empty() {
            return Err(self.err(line, "record missing msgsrc"));
        }
        if record.sources.len() > MAX_PLURAL_FORMS as usize {
            return Err(self.err(
                line,
                format!("too many plural forms ({})", record.sources.len()),
            ));
        }

        let key = MessageKey::new(record.context, id, record.sources.len() as u8);
        if self.catalog.contains_key(&key) {
            return Err(self.err(line, format!("duplicate key `{}`", key)));
        }

        let mut entry = CatalogEntry::new(
            key,
            SmallVec::from_vec(record.sources),
            record.references,
        );
        if record.translations.iter().any(|form| !form.is_empty()) {
            entry.translation = SmallVec::from_vec(record.translations);
        }
        entry.previous_source = record.previous_source;
        entry.status = if record.obsolete {
            EntryStatus::Obsolete
        } else if record.fuzzy {
            EntryStatus::Fuzzy
        } else if entry.is_translated() {
            EntryStatus::Translated
        } else {
            EntryStatus::New
        };
        self.catalog.insert(entry);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), CatalogFormatError> {
        self.flush()
    }
}

/// `file:line[:col]`, parsed from the right so paths may contain colons.
fn parse_reference(token: &str) -> Option<SourceReference> {
    let parts: Vec<&str> = token.split(':').collect();
    if parts.len() >= 3 {
        if let (Ok(line), Ok(col)) = (
            parts[parts.len() - 2].parse::<u32>(),
            parts[parts.len() - 1].parse::<u32>(),
        ) {
            let file = parts[..parts.len() - 2].join(":");
            if !file.is_empty() {
                return Some(SourceReference::new(file, line, col));
            }
        }
    }
    if parts.len() >= 2 {
        if let Ok(line) = parts[parts.len() - 1].parse::<u32>() {
            let file = parts[..parts.len() - 1].join(":");
            if !file.is_empty() {
                return Some(SourceReference::new(file, line, 0));
            }
        }
    }
    None
}
