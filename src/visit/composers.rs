//! Composition utilities for common visitor patterns.
//!
//! Helpers that reduce boilerplate when a pass only needs to detect nodes or
//! gather names.
//!
//! ```
//! use refactorkit::visit::composers::*;
//! use refactorkit::parser::{ast::*, parse_unit};
//!
//! let unit = parse_unit("class A { void M(object o) { if (o is A) { return; } } }").unwrap();
//! let body = unit.types[0].node.methods[0].node.body.as_ref().unwrap();
//! assert!(stmt_contains_expr(&body.node.stmts[0], |e| matches!(e, Expr::Is { .. })));
//! assert!(contains_stmt(&body.node.stmts[0], |s| matches!(s, Stmt::Return(_))));
//! ```

use crate::parser::ast::*;
use crate::span::Spanned;
use crate::visit::{walk_expr, walk_stmt, Visitor};
use std::collections::HashSet;

// ============================================================================
// Detection
// ============================================================================

/// Check if a statement (including nested statements and expressions) contains
/// an expression matching a predicate.
///
/// Short-circuits on first match.
pub fn stmt_contains_expr<F>(stmt: &Spanned<Stmt>, predicate: F) -> bool
where
    F: Fn(&Expr) -> bool,
{
    let mut detector = Detector { predicate, found: false };
    detector.visit_stmt(stmt);
    detector.found
}

struct Detector<F> {
    predicate: F,
    found: bool,
}

impl<F> Visitor for Detector<F>
where
    F: Fn(&Expr) -> bool,
{
    fn visit_stmt(&mut self, stmt: &Spanned<Stmt>) {
        if !self.found {
            walk_stmt(self, stmt);
        }
    }

    fn visit_expr(&mut self, expr: &Spanned<Expr>) {
        if self.found {
            return;
        }
        if (self.predicate)(&expr.node) {
            self.found = true;
            return;
        }
        walk_expr(self, expr);
    }
}

/// Check if a statement tree contains a statement matching a predicate.
pub fn contains_stmt<F>(stmt: &Spanned<Stmt>, predicate: F) -> bool
where
    F: Fn(&Stmt) -> bool,
{
    struct StmtDetector<F> {
        predicate: F,
        found: bool,
    }

    impl<F> Visitor for StmtDetector<F>
    where
        F: Fn(&Stmt) -> bool,
    {
        fn visit_stmt(&mut self, stmt: &Spanned<Stmt>) {
            if self.found {
                return;
            }
            if (self.predicate)(&stmt.node) {
                self.found = true;
                return;
            }
            walk_stmt(self, stmt);
        }

        // Statements never nest inside expressions.
        fn visit_expr(&mut self, _expr: &Spanned<Expr>) {}
    }

    let mut detector = StmtDetector { predicate, found: false };
    detector.visit_stmt(stmt);
    detector.found
}

// ============================================================================
// Collection
// ============================================================================

/// Every identifier name bound or referenced inside a block: locals,
/// `foreach` variables and identifier expressions. Names are stored
/// without the verbatim `@` prefix.
pub fn names_in_block(block: &Spanned<Block>) -> HashSet<String> {
    struct Names(HashSet<String>);

    impl Visitor for Names {
        fn visit_stmt(&mut self, stmt: &Spanned<Stmt>) {
            match &stmt.node {
                Stmt::Local { name, .. } | Stmt::Foreach { name, .. } => {
                    self.0.insert(ident_value(&name.node).to_string());
                }
                _ => {}
            }
            walk_stmt(self, stmt);
        }

        fn visit_expr(&mut self, expr: &Spanned<Expr>) {
            if let Expr::Ident(name) = &expr.node {
                self.0.insert(ident_value(name).to_string());
            }
            walk_expr(self, expr);
        }
    }

    let mut names = Names(HashSet::new());
    names.visit_block(block);
    names.0
}
