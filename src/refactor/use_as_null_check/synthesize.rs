use tracing::trace;

use crate::parser::ast::{Block, CompilationUnit, Stmt};
use crate::refactor::action::Fragment;
use crate::refactor::build;
use crate::refactor::naming::{binding_name, taken_names};
use crate::span::Spanned;
use crate::syntax::{locate, node_at, replace_at, NodeRef, Replacement};

use super::recognize::{InsertionSite, NullCheckMatch, Polarity};

/// Build the replacement for a recognized match.
///
/// Occurrences and the test are rewritten on a copy of `unit`; the returned
/// fragment then replaces the whole insertion site (the enclosing block, or
/// the embedded `if`) in one splice.
pub fn synthesize(found: &NullCheckMatch, unit: &CompilationUnit) -> Option<Fragment> {
    let tested = node_at(unit, found.tested.as_slice())?.as_expr()?;
    let NodeRef::TypeExpr(target) = node_at(unit, found.target_type.as_slice())? else {
        return None;
    };

    let method = locate(unit, &found.method)?;
    let NodeRef::Method(decl) = method.node else { return None };
    let NodeRef::Type(owner) = method.parent()?.node else { return None };
    let name = binding_name(&target.node, &taken_names(&owner.node, &decl.node))?;
    trace!(binding = %name, occurrences = found.occurrences.len(), "synthesizing");

    let mut work = unit.clone();
    for occurrence in &found.occurrences {
        work = replace_at(&work, occurrence.as_slice(), Replacement::Expr(build::ident(&name)))?;
    }
    let check = build::null_check(&name, found.polarity == Polarity::Negative);
    work = replace_at(&work, found.replaced.as_slice(), Replacement::Expr(check))?;

    let declaration = build::as_binding(&name, tested, &target.node);
    match &found.site {
        InsertionSite::Block { block, index } => {
            let container = node_at(&work, block.as_slice())?;
            let mut stmts = container.block_stmts()?.to_vec();
            if *index > stmts.len() {
                return None;
            }
            stmts.insert(*index, declaration);
            let replacement = match container {
                NodeRef::Block(b) => Replacement::Block(Spanned::new(Block { stmts }, b.span)),
                NodeRef::Stmt(s) => Replacement::Stmt(Spanned::new(Stmt::Block(Block { stmts }), s.span)),
                _ => return None,
            };
            Fragment::new(unit, block.clone(), replacement)
        }
        InsertionSite::Embedded { stmt } => {
            let if_stmt = node_at(&work, stmt.as_slice())?.as_stmt()?.clone();
            Fragment::new(unit, stmt.clone(), Replacement::Stmt(build::block_stmt(vec![declaration, if_stmt])))
        }
    }
}
