use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::diagnostics::ApplyError;
use crate::document::Document;
use crate::parser::ast::{CompilationUnit, Expr, Stmt, TypeExpr, UsingDirective};
use crate::span::{Annotations, Span, Spanned};
use crate::syntax::{node_at, replace_at, NodePath, Replacement, SyntaxKind};
use crate::visit::{walk_expr, walk_stmt, Visitor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Hidden,
    Info,
    Warning,
    Error,
}

pub type ApplyFn = Arc<dyn Fn(&Document) -> Result<Document, ApplyError> + Send + Sync>;

/// An offered refactoring. Nothing is computed until `apply` is called.
#[derive(Clone)]
pub struct CodeAction {
    provider: &'static str,
    span: Span,
    severity: Severity,
    title: String,
    apply: ApplyFn,
}

impl CodeAction {
    pub fn new<F>(provider: &'static str, span: Span, severity: Severity, title: impl Into<String>, apply: F) -> Self
    where
        F: Fn(&Document) -> Result<Document, ApplyError> + Send + Sync + 'static,
    {
        Self { provider, span, severity, title: title.into(), apply: Arc::new(apply) }
    }

    pub fn provider(&self) -> &'static str {
        self.provider
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn apply(&self, document: &Document) -> Result<Document, ApplyError> {
        (self.apply)(document)
    }

    pub fn info(&self) -> ActionInfo {
        ActionInfo {
            provider: self.provider,
            title: self.title.clone(),
            severity: self.severity,
            start: self.span.start,
            end: self.span.end,
        }
    }
}

impl fmt::Debug for CodeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeAction")
            .field("provider", &self.provider)
            .field("span", &self.span)
            .field("severity", &self.severity)
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

/// Host-facing description of an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionInfo {
    pub provider: &'static str,
    pub title: String,
    pub severity: Severity,
    pub start: usize,
    pub end: usize,
}

/// A synthesized subtree and the place it goes.
///
/// The kind and span of the node originally at `target` are remembered so
/// applying to a snapshot whose tree has moved on fails instead of splicing
/// into the wrong node.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    target: NodePath,
    node: Replacement,
    expected_kind: SyntaxKind,
    expected_span: Span,
}

impl Fragment {
    /// `None` when `target` is not a node of `unit`.
    pub fn new(unit: &CompilationUnit, target: NodePath, node: Replacement) -> Option<Self> {
        let original = node_at(unit, target.as_slice())?;
        Some(Self { expected_kind: original.kind(), expected_span: original.span(), target, node })
    }

    pub fn target(&self) -> &NodePath {
        &self.target
    }

    pub fn node(&self) -> &Replacement {
        &self.node
    }

    /// Union of the normalization requests carried by the new subtree.
    pub fn pending(&self) -> Annotations {
        let mut marks = MarkCollector(Annotations::empty());
        match &self.node {
            Replacement::Block(b) => {
                marks.0 |= b.span.marks;
                marks.visit_block(b);
            }
            Replacement::Stmt(s) => marks.visit_stmt(s),
            Replacement::Expr(e) => marks.visit_expr(e),
        }
        marks.0
    }

    pub fn apply(&self, document: &Document) -> Result<Document, ApplyError> {
        let stale = || ApplyError::stale(&document.name, self.target.as_slice(), self.node.describe());
        let current = node_at(&document.root, self.target.as_slice()).ok_or_else(stale)?;
        if current.kind() != self.expected_kind || current.span() != self.expected_span {
            return Err(stale());
        }
        let root = replace_at(&document.root, self.target.as_slice(), self.node.clone()).ok_or_else(stale)?;
        Ok(document.with_root(root))
    }
}

struct MarkCollector(Annotations);

impl Visitor for MarkCollector {
    fn visit_stmt(&mut self, stmt: &Spanned<Stmt>) {
        self.0 |= stmt.span.marks;
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &Spanned<Expr>) {
        self.0 |= expr.span.marks;
        walk_expr(self, expr);
    }

    fn visit_type_expr(&mut self, te: &Spanned<TypeExpr>) {
        self.0 |= te.span.marks;
    }
}

fn is_system_namespace(name: &str) -> bool {
    name == "System" || name.starts_with("System.")
}

fn using_sort_key(name: &str) -> (bool, &str) {
    (!is_system_namespace(name), name)
}

/// Add `using <namespace>;` unless a directive with exactly that name exists.
///
/// The directive goes before the first existing one that sorts after it,
/// `System` namespaces first. Returns whether anything was inserted.
pub fn ensure_using(unit: &mut CompilationUnit, namespace: &str) -> bool {
    if unit.has_using(namespace) {
        return false;
    }
    let key = using_sort_key(namespace);
    let index = unit
        .usings
        .iter()
        .position(|u| using_sort_key(&u.node.name.node) > key)
        .unwrap_or(unit.usings.len());
    let directive = Spanned::synthesized(
        UsingDirective { name: Spanned::synthesized(namespace.to_string(), crate::refactor::build::marks()) },
        crate::refactor::build::marks(),
    );
    unit.usings.insert(index, directive);
    true
}
