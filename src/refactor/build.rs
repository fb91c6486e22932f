//! Constructors for synthesized nodes.
//!
//! Every node built here, and every subtree cloned into a rewrite, carries
//! the `FORMAT | SIMPLIFY` marks so the host can normalize it on the way out.

use crate::parser::ast::*;
use crate::span::{Annotations, Span, Spanned};
use crate::visit::{walk_expr_mut, VisitMut};

pub fn marks() -> Annotations {
    Annotations::FORMAT | Annotations::SIMPLIFY
}

fn node<T>(value: T) -> Spanned<T> {
    Spanned::synthesized(value, marks())
}

pub fn ident(name: &str) -> Spanned<Expr> {
    node(Expr::Ident(name.to_string()))
}

/// `name != null`, or `name == null` when `negated`.
pub fn null_check(name: &str, negated: bool) -> Spanned<Expr> {
    let op = if negated { BinOp::Eq } else { BinOp::Neq };
    node(Expr::Binary { op, lhs: Box::new(ident(name)), rhs: Box::new(node(Expr::Null)) })
}

/// `var name = <tested> as <target>;`
pub fn as_binding(name: &str, tested: &Spanned<Expr>, target: &TypeExpr) -> Spanned<Stmt> {
    let init = node(Expr::As { expr: Box::new(resynthesized_expr(tested)), ty: node(target.clone()) });
    node(Stmt::Local { ty: node(TypeExpr::Var), name: node(name.to_string()), init: Some(init) })
}

/// `{ stmts }` as a statement.
pub fn block_stmt(stmts: Vec<Spanned<Stmt>>) -> Spanned<Stmt> {
    node(Stmt::Block(Block { stmts }))
}

/// `<class>.Requires(<param> != null);`
pub fn requires_not_null(contract_class: &str, param: &str) -> Spanned<Stmt> {
    let callee = node(Expr::Member { object: Box::new(ident(contract_class)), name: node("Requires".to_string()) });
    let call = node(Expr::Call { callee: Box::new(callee), args: vec![null_check(param, false)] });
    node(Stmt::Expr(call))
}

/// Deep copy of an existing expression with every span marked synthesized.
pub fn resynthesized_expr(expr: &Spanned<Expr>) -> Spanned<Expr> {
    let mut copy = expr.clone();
    Resynthesize.visit_expr_mut(&mut copy);
    copy
}

struct Resynthesize;

fn mark(span: &mut Span) {
    *span = Span::synthesized(marks());
}

impl VisitMut for Resynthesize {
    fn visit_expr_mut(&mut self, expr: &mut Spanned<Expr>) {
        mark(&mut expr.span);
        match &mut expr.node {
            Expr::Is { ty, keyword, .. } => {
                mark(&mut ty.span);
                mark(keyword);
            }
            Expr::As { ty, .. } | Expr::Cast { ty, .. } | Expr::New { ty, .. } => mark(&mut ty.span),
            Expr::Member { name, .. } => mark(&mut name.span),
            _ => {}
        }
        walk_expr_mut(self, expr);
    }
}
