//! Message Extraction
//!
//! Walks a parsed translation unit and collects translatable-message call
//! sites. Which function names count as translation markers is explicit
//! configuration data passed in by the caller, never process-wide state.

use crate::catalog::{MessageKey, MAX_PLURAL_FORMS};
use crate::diagnostics::Diagnostic;
use crate::source::SourceReference;
use crate::syntax::{walk_unit, Call, TranslationUnit, Visitor};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

/// One recognized call-site shape: the callee name and which argument
/// positions carry the key id, the default text and the optional context and
/// plural variant. All of them must be literal at the call site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerSpec {
    pub name: String,
    pub id_arg: usize,
    pub text_arg: usize,
    #[serde(default)]
    pub context_arg: Option<usize>,
    #[serde(default)]
    pub plural_arg: Option<usize>,
}

impl MarkerSpec {
    pub fn new(name: impl Into<String>, id_arg: usize, text_arg: usize) -> Self {
        MarkerSpec {
            name: name.into(),
            id_arg,
            text_arg,
            context_arg: None,
            plural_arg: None,
        }
    }

    pub fn with_context(mut self, context_arg: usize) -> Self {
        self.context_arg = Some(context_arg);
        self
    }

    pub fn with_plural(mut self, plural_arg: usize) -> Self {
        self.plural_arg = Some(plural_arg);
        self
    }

    /// Smallest argument count a well-formed call must supply.
    fn min_args(&self) -> usize {
        let mut min = self.id_arg.max(self.text_arg);
        if let Some(context_arg) = self.context_arg {
            min = min.max(context_arg);
        }
        if let Some(plural_arg) = self.plural_arg {
            min = min.max(plural_arg);
        }
        min + 1
    }
}

static DEFAULT_MARKERS: Lazy<Vec<MarkerSpec>> = Lazy::new(|| {
    vec![
        MarkerSpec::new("translate", 0, 1),
        MarkerSpec::new("translate_ctx", 1, 2).with_context(0),
        MarkerSpec::new("translate_plural", 0, 1).with_plural(2),
        MarkerSpec::new("translate_ctx_plural", 1, 2)
            .with_context(0)
            .with_plural(3),
    ]
});

/// The full marker set for one extraction run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerConfig {
    pub markers: Vec<MarkerSpec>,
    /// When set, an explicit empty-string context stays distinct from an
    /// absent context argument. Off by default: `translate_ctx("", ...)` then
    /// derives the same key as `translate(...)`.
    #[serde(default)]
    pub distinct_empty_context: bool,
}

impl MarkerConfig {
    pub fn new(markers: Vec<MarkerSpec>) -> Self {
        MarkerConfig {
            markers,
            distinct_empty_context: false,
        }
    }

    pub fn find(&self, callee: &str) -> Option<&MarkerSpec> {
        self.markers.iter().find(|spec| spec.name == callee)
    }
}

impl Default for MarkerConfig {
    fn default() -> Self {
        MarkerConfig::new(DEFAULT_MARKERS.clone())
    }
}

/// One extracted call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedMessage {
    pub key: MessageKey,
    /// Source text, one form per plural variant (singular first).
    pub text: SmallVec<[String; 2]>,
    pub reference: SourceReference,
}

impl ExtractedMessage {
    pub fn new(key: MessageKey, text: Vec<String>, reference: SourceReference) -> Self {
        ExtractedMessage {
            key,
            text: SmallVec::from_vec(text),
            reference,
        }
    }
}

/// Ephemeral, produced per translation unit and consumed once by the merge
/// engine. Messages appear in depth-first traversal order.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    pub file_path: String,
    pub messages: Vec<ExtractedMessage>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Extract all message call sites from one unit. Never mutates the tree;
/// malformed or computed call sites yield diagnostics and are excluded while
/// traversal continues over siblings.
pub fn extract_unit(unit: &TranslationUnit, config: &MarkerConfig) -> ExtractionResult {
    let mut visitor = ExtractVisitor {
        config,
        file_path: &unit.file_path,
        messages: Vec::new(),
        diagnostics: Vec::new(),
    };
    walk_unit(unit, &mut visitor);
    ExtractionResult {
        file_path: unit.file_path.clone(),
        messages: visitor.messages,
        diagnostics: visitor.diagnostics,
    }
}

struct ExtractVisitor<'a> {
    config: &'a MarkerConfig,
    file_path: &'a str,
    messages: Vec<ExtractedMessage>,
    diagnostics: Vec<Diagnostic>,
}

impl ExtractVisitor<'_> {
    /// Fetch a literal argument, reporting the right diagnostic when the
    /// call site supplies something computed instead.
    fn literal_arg(&mut self, call: &Call, index: usize, role: &str) -> Option<String> {
        let arg = &call.args[index];
        match arg.literal_text() {
            Some(text) => Some(text),
            None => {
                let reference = arg.span().reference(self.file_path);
                self.diagnostics.push(Diagnostic::warning(
                    Some(reference),
                    format!(
                        "extraction skipped: computed {} in call to `{}`",
                        role, call.callee
                    ),
                ));
                None
            }
        }
    }
}

impl Visitor for ExtractVisitor<'_> {
    fn visit_call(&mut self, call: &Call) {
        let Some(spec) = self.config.find(&call.callee) else {
            return;
        };
        let reference = call.span.reference(self.file_path);

        if call.args.len() < spec.min_args() {
            self.diagnostics.push(Diagnostic::error(
                Some(reference),
                format!(
                    "marker `{}` expects at least {} arguments, found {}",
                    call.callee,
                    spec.min_args(),
                    call.args.len()
                ),
            ));
            return;
        }

        let Some(id) = self.literal_arg(call, spec.id_arg, "message id") else {
            return;
        };
        if id.is_empty() {
            self.diagnostics.push(Diagnostic::error(
                Some(reference),
                format!("marker `{}` called with an empty message id", call.callee),
            ));
            return;
        }

        let Some(singular) = self.literal_arg(call, spec.text_arg, "source text") else {
            return;
        };

        let context = match spec.context_arg {
            Some(index) => match self.literal_arg(call, index, "context") {
                Some(context) => {
                    if context.is_empty() && !self.config.distinct_empty_context {
                        None
                    } else {
                        Some(context)
                    }
                }
                None => return,
            },
            None => None,
        };

        let mut text: SmallVec<[String; 2]> = smallvec![singular];
        if let Some(index) = spec.plural_arg {
            let Some(plural) = self.literal_arg(call, index, "plural text") else {
                return;
            };
            text.push(plural);
        }
        debug_assert!(text.len() <= MAX_PLURAL_FORMS as usize);

        let key = MessageKey::new(context, id, text.len() as u8);
        self.messages.push(ExtractedMessage {
            key,
            text,
            reference,
        });
    }
}
