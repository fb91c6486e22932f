//! Structural expression comparison.
//!
//! Two expressions are equivalent when they have the same shape once spans
//! and redundant parentheses are ignored. Identifiers compare by value, so
//! `@foo` and `foo` are the same name.

use crate::parser::ast::*;
use crate::span::Spanned;

pub fn equivalent(a: &Spanned<Expr>, b: &Spanned<Expr>) -> bool {
    let (a, b) = (strip_parens(a), strip_parens(b));
    match (&a.node, &b.node) {
        (Expr::Ident(x), Expr::Ident(y)) => ident_value(x) == ident_value(y),
        (Expr::IntLit(x), Expr::IntLit(y)) => x == y,
        (Expr::StringLit(x), Expr::StringLit(y)) => x == y,
        (Expr::BoolLit(x), Expr::BoolLit(y)) => x == y,
        (Expr::Null, Expr::Null) | (Expr::This, Expr::This) => true,
        (Expr::Unary { op: o1, operand: x }, Expr::Unary { op: o2, operand: y }) => o1 == o2 && equivalent(x, y),
        (Expr::Postfix { op: o1, operand: x }, Expr::Postfix { op: o2, operand: y }) => o1 == o2 && equivalent(x, y),
        (Expr::Binary { op: o1, lhs: l1, rhs: r1 }, Expr::Binary { op: o2, lhs: l2, rhs: r2 }) => {
            o1 == o2 && equivalent(l1, l2) && equivalent(r1, r2)
        }
        (Expr::Assign { op: o1, target: t1, value: v1 }, Expr::Assign { op: o2, target: t2, value: v2 }) => {
            o1 == o2 && equivalent(t1, t2) && equivalent(v1, v2)
        }
        (Expr::Is { expr: x, ty: t1, .. }, Expr::Is { expr: y, ty: t2, .. })
        | (Expr::As { expr: x, ty: t1 }, Expr::As { expr: y, ty: t2 })
        | (Expr::Cast { expr: x, ty: t1 }, Expr::Cast { expr: y, ty: t2 }) => {
            same_type(&t1.node, &t2.node) && equivalent(x, y)
        }
        (Expr::Member { object: o1, name: n1 }, Expr::Member { object: o2, name: n2 }) => {
            ident_value(&n1.node) == ident_value(&n2.node) && equivalent(o1, o2)
        }
        (Expr::Call { callee: c1, args: a1 }, Expr::Call { callee: c2, args: a2 }) => {
            equivalent(c1, c2) && all_equivalent(a1, a2)
        }
        (Expr::New { ty: t1, args: a1 }, Expr::New { ty: t2, args: a2 }) => {
            same_type(&t1.node, &t2.node) && all_equivalent(a1, a2)
        }
        _ => false,
    }
}

fn all_equivalent(a: &[Spanned<Expr>], b: &[Spanned<Expr>]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| equivalent(x, y))
}

/// Type syntax equality with `@` escapes ignored per name segment.
pub fn same_type(a: &TypeExpr, b: &TypeExpr) -> bool {
    match (a, b) {
        (TypeExpr::Var, TypeExpr::Var) => true,
        (TypeExpr::Named(x), TypeExpr::Named(y)) => {
            let xs = x.split('.').map(ident_value);
            let ys = y.split('.').map(ident_value);
            xs.eq(ys)
        }
        (TypeExpr::Nullable(x), TypeExpr::Nullable(y)) | (TypeExpr::Array(x), TypeExpr::Array(y)) => same_type(x, y),
        _ => false,
    }
}

/// A storage location whose value only changes through an assignment to it
/// or to its root: `foo`, `this.foo`, `foo.bar.baz`.
pub fn is_pure_path(expr: &Spanned<Expr>) -> bool {
    match &strip_parens(expr).node {
        Expr::Ident(_) | Expr::This => true,
        Expr::Member { object, .. } => is_pure_path(object),
        _ => false,
    }
}

/// Root variable name of a pure path; `this.x.y` is rooted at `x`.
pub fn root_name(expr: &Spanned<Expr>) -> Option<&str> {
    match &strip_parens(expr).node {
        Expr::Ident(name) => Some(ident_value(name)),
        Expr::Member { object, name } => {
            if matches!(strip_parens(object).node, Expr::This) {
                Some(ident_value(&name.node))
            } else {
                root_name(object)
            }
        }
        _ => None,
    }
}

/// Target type and operand of a cast or `as` conversion, looking through parentheses.
pub fn conversion_parts(expr: &Spanned<Expr>) -> Option<(&TypeExpr, &Spanned<Expr>)> {
    match &strip_parens(expr).node {
        Expr::Cast { ty, expr } | Expr::As { expr, ty } => Some((&ty.node, expr)),
        _ => None,
    }
}
