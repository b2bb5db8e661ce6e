//! Syntax Tree
//!
//! Expression nodes handed over by the compiler front-end. Only the shapes
//! the extractor cares about are modelled: string literals, adjacent-literal
//! concatenations, identifiers, numbers and call expressions. Everything the
//! front-end cannot classify arrives as `Expr::Ident` (an opaque, computed
//! value). The tree is read-only for the extractor.

use crate::source::Span;

/// One parsed source file, as delivered by the front-end.
#[derive(Debug, Clone)]
pub struct TranslationUnit {
    pub file_path: String,
    pub roots: Vec<Expr>,
}

impl TranslationUnit {
    pub fn new(file_path: impl Into<String>, roots: Vec<Expr>) -> Self {
        TranslationUnit {
            file_path: file_path.into(),
            roots,
        }
    }
}

/// Enum representing all syntax node variants the extractor distinguishes
#[derive(Debug, Clone)]
pub enum Expr {
    StringLit(StringLit),
    Concat(Concat),
    Ident(Ident),
    Number(Number),
    Call(Call),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::StringLit(n) => n.span,
            Expr::Concat(n) => n.span,
            Expr::Ident(n) => n.span,
            Expr::Number(n) => n.span,
            Expr::Call(n) => n.span,
        }
    }

    /// Collapse this expression to literal text, applying the host language's
    /// concatenation rule for adjacent string literals. Returns `None` for
    /// anything computed at runtime.
    pub fn literal_text(&self) -> Option<String> {
        match self {
            Expr::StringLit(lit) => Some(lit.value.clone()),
            Expr::Concat(concat) => {
                let mut merged = String::new();
                for part in &concat.parts {
                    merged.push_str(&part.literal_text()?);
                }
                Some(merged)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StringLit {
    pub value: String,
    pub span: Span,
}

impl StringLit {
    pub fn new(value: impl Into<String>, span: Span) -> Self {
        StringLit {
            value: value.into(),
            span,
        }
    }
}

/// Adjacent string literals, merged into one literal before key derivation.
#[derive(Debug, Clone)]
pub struct Concat {
    pub parts: Vec<Expr>,
    pub span: Span,
}

impl Concat {
    pub fn new(parts: Vec<Expr>, span: Span) -> Self {
        Concat { parts, span }
    }
}

/// An opaque, computed value (variable reference, arbitrary expression).
#[derive(Debug, Clone)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Ident {
            name: name.into(),
            span,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Number {
    pub value: i64,
    pub span: Span,
}

impl Number {
    pub fn new(value: i64, span: Span) -> Self {
        Number { value, span }
    }
}

#[derive(Debug, Clone)]
pub struct Call {
    pub callee: String,
    pub args: Vec<Expr>,
    pub span: Span,
}

impl Call {
    pub fn new(callee: impl Into<String>, args: Vec<Expr>, span: Span) -> Self {
        Call {
            callee: callee.into(),
            args,
            span,
        }
    }
}

/// Visitor trait for traversing the syntax tree
pub trait Visitor {
    fn visit_string_lit(&mut self, _lit: &StringLit) {}
    fn visit_concat(&mut self, _concat: &Concat) {}
    fn visit_ident(&mut self, _ident: &Ident) {}
    fn visit_number(&mut self, _number: &Number) {}
    fn visit_call(&mut self, _call: &Call) {}
}

/// Depth-first traversal. The visitor sees a node before its children, so
/// marker calls nested inside the arguments of other calls are still found.
pub fn walk_expr<V: Visitor>(expr: &Expr, visitor: &mut V) {
    match expr {
        Expr::StringLit(lit) => visitor.visit_string_lit(lit),
        Expr::Concat(concat) => {
            visitor.visit_concat(concat);
            for part in &concat.parts {
                walk_expr(part, visitor);
            }
        }
        Expr::Ident(ident) => visitor.visit_ident(ident),
        Expr::Number(number) => visitor.visit_number(number),
        Expr::Call(call) => {
            visitor.visit_call(call);
            for arg in &call.args {
                walk_expr(arg, visitor);
            }
        }
    }
}

/// Walk every root expression of a unit in order.
pub fn walk_unit<V: Visitor>(unit: &TranslationUnit, visitor: &mut V) {
    for root in &unit.roots {
        walk_expr(root, visitor);
    }
}
