//! Offers `Contract.Requires(p != null);` for a reference-typed parameter.

use tracing::debug;

use crate::diagnostics::{ApplyError, Cancelled};
use crate::document::Document;
use crate::parser::ast::Block;
use crate::span::Spanned;
use crate::syntax::{node_at, replace_at, NodePath, NodeRef, Replacement, SyntaxKind};

use super::action::{ensure_using, CodeAction, Severity};
use super::build;
use super::trigger::parameter_trigger;
use super::{Outcome, Provider, RefactoringContext};

pub const ID: &str = "contract-requires-not-null";
pub const TITLE: &str = "Add contract requires parameter must not be null";
pub const CONTRACT_CLASS: &str = "Contract";

pub fn provider() -> Provider {
    Provider { id: ID, trigger: SyntaxKind::Parameter, compute }
}

fn compute(ctx: &RefactoringContext<'_>) -> Result<Outcome, Cancelled> {
    ctx.cancel.check()?;
    let Some(found) = parameter_trigger(ctx, CONTRACT_CLASS) else {
        return Ok(Outcome::NoMatch);
    };

    let param = found.param.node.name.node.clone();
    let namespace = ctx.config.contracts.namespace.clone();
    let body_path = found.body_path.clone();
    debug!(provider = ID, param = %param, method = %found.method.node.name.node, "offering contract");

    let action = CodeAction::new(ID, found.param.node.name.span, Severity::Info, TITLE, move |doc: &Document| {
        insert_requires(doc, &body_path, &param, &namespace)
    });
    Ok(Outcome::Actions(vec![action]))
}

/// Prepend the contract to the body at `body_path` and import `namespace`.
fn insert_requires(doc: &Document, body_path: &NodePath, param: &str, namespace: &str) -> Result<Document, ApplyError> {
    let stale = || ApplyError::stale(&doc.name, body_path.as_slice(), "block");
    let Some(NodeRef::Block(body)) = node_at(&doc.root, body_path.as_slice()) else {
        return Err(stale());
    };

    let mut stmts = Vec::with_capacity(body.node.stmts.len() + 1);
    stmts.push(build::requires_not_null(CONTRACT_CLASS, param));
    stmts.extend(body.node.stmts.iter().cloned());
    let new_body = Spanned::new(Block { stmts }, body.span);

    let mut root = replace_at(&doc.root, body_path.as_slice(), Replacement::Block(new_body)).ok_or_else(stale)?;
    ensure_using(&mut root, namespace);
    Ok(doc.with_root(root))
}
