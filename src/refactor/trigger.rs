//! Locating the node a provider acts on.
//!
//! A provider fires only when the cursor lies inside the *trigger span* of
//! its node kind: the `is` keyword for type tests, the identifier for
//! parameters, the whole node otherwise.

use crate::parser::ast::*;
use crate::span::{Span, Spanned};
use crate::syntax::{find_innermost, Located, NodePath, NodeRef, SyntaxKind};
use tracing::trace;

use super::RefactoringContext;

pub fn trigger_span(node: NodeRef<'_>) -> Span {
    match node {
        NodeRef::Expr(Spanned { node: Expr::Is { keyword, .. }, .. }) => *keyword,
        NodeRef::Param(p) => p.node.name.span,
        other => other.span(),
    }
}

/// Innermost node of `kind` containing `cursor`, if the cursor is also inside
/// its trigger span.
pub fn find_trigger<'a>(unit: &'a CompilationUnit, cursor: Span, kind: SyntaxKind) -> Option<Located<'a>> {
    let found = find_innermost(unit, cursor, kind)?;
    if trigger_span(found.node).contains(cursor) {
        Some(found)
    } else {
        trace!(?kind, start = cursor.start, "cursor outside trigger span");
        None
    }
}

/// A parameter of a method with a body, with the path to that body.
#[derive(Debug, Clone)]
pub struct ParameterTrigger<'a> {
    pub param: &'a Spanned<Param>,
    pub method: &'a Spanned<MethodDecl>,
    pub body: &'a Spanned<Block>,
    pub body_path: NodePath,
}

/// Parameter under the cursor that is a reference type, belongs to a method
/// with a body, and is not already guarded by a not-null contract.
pub fn parameter_trigger<'a>(ctx: &RefactoringContext<'a>, contract_class: &str) -> Option<ParameterTrigger<'a>> {
    let located = find_trigger(&ctx.document.root, ctx.span, SyntaxKind::Parameter)?;
    let NodeRef::Param(param) = located.node else { return None };
    let owner = located.parent()?;
    let NodeRef::Method(method) = owner.node else { return None };
    let Some(body) = &method.node.body else {
        trace!(param = %param.node.name.node, "method has no body");
        return None;
    };

    let symbol = ctx.model.declared_symbol(located.node)?;
    let ty = ctx.model.type_of_symbol(&symbol)?;
    if ctx.model.is_value_type(&ty) {
        trace!(param = %symbol.name, ty = %ty.name, "value-typed parameter");
        return None;
    }
    if has_not_null_contract(&body.node, contract_class, &param.node.name.node) {
        trace!(param = %symbol.name, "contract already present");
        return None;
    }

    let body_index = usize::from(method.node.return_type.is_some()) + method.node.params.len();
    Some(ParameterTrigger { param, method, body, body_path: owner.path.child(body_index) })
}

/// True when a top-level expression statement of `body` reads, identifier by
/// identifier, as `<contract_class>.Requires(<param> ...)`.
pub fn has_not_null_contract(body: &Block, contract_class: &str, param: &str) -> bool {
    let wanted = [contract_class, "Requires", param].map(ident_value);
    body.stmts.iter().any(|stmt| match &stmt.node {
        Stmt::Expr(expr) => {
            let mut names = Vec::new();
            flatten_identifiers(expr, &mut names);
            names.len() == wanted.len() && names.iter().zip(wanted).all(|(a, b)| ident_value(a) == b)
        }
        _ => false,
    })
}

/// Identifier tokens of an expression in source order, member names included.
fn flatten_identifiers<'a>(expr: &'a Spanned<Expr>, out: &mut Vec<&'a str>) {
    match &expr.node {
        Expr::Ident(name) => out.push(name),
        Expr::IntLit(_) | Expr::StringLit(_) | Expr::BoolLit(_) | Expr::Null | Expr::This => {}
        Expr::Paren(inner) | Expr::Unary { operand: inner, .. } | Expr::Postfix { operand: inner, .. } => {
            flatten_identifiers(inner, out)
        }
        Expr::Binary { lhs, rhs, .. } | Expr::Assign { target: lhs, value: rhs, .. } => {
            flatten_identifiers(lhs, out);
            flatten_identifiers(rhs, out);
        }
        Expr::Is { expr: inner, ty, .. } | Expr::As { expr: inner, ty } => {
            flatten_identifiers(inner, out);
            type_identifiers(&ty.node, out);
        }
        Expr::Cast { ty, expr: inner } => {
            type_identifiers(&ty.node, out);
            flatten_identifiers(inner, out);
        }
        Expr::Member { object, name } => {
            flatten_identifiers(object, out);
            out.push(&name.node);
        }
        Expr::Call { callee, args } => {
            flatten_identifiers(callee, out);
            args.iter().for_each(|a| flatten_identifiers(a, out));
        }
        Expr::New { ty, args } => {
            type_identifiers(&ty.node, out);
            args.iter().for_each(|a| flatten_identifiers(a, out));
        }
    }
}

fn type_identifiers<'a>(ty: &'a TypeExpr, out: &mut Vec<&'a str>) {
    match ty {
        TypeExpr::Var => {}
        TypeExpr::Named(name) => out.extend(name.split('.')),
        TypeExpr::Nullable(inner) | TypeExpr::Array(inner) => type_identifiers(inner, out),
    }
}
