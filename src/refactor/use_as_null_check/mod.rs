//! Rewrites `if (e is T) { ... (T)e ... }` into a single `as` conversion
//! followed by a null check, reusing the converted value.

pub mod recognize;
pub mod synthesize;

pub use recognize::{always_exits, recognize, InsertionSite, NullCheckMatch, Polarity, Shape};
pub use synthesize::synthesize;

use tracing::debug;

use crate::diagnostics::Cancelled;
use crate::document::Document;
use crate::syntax::SyntaxKind;

use super::action::{CodeAction, Severity};
use super::{Outcome, Provider, RefactoringContext};

pub const ID: &str = "use-as-and-null-check";
pub const TITLE: &str = "Use 'as' and null check";

pub fn provider() -> Provider {
    Provider { id: ID, trigger: SyntaxKind::IsExpr, compute }
}

fn compute(ctx: &RefactoringContext<'_>) -> Result<Outcome, Cancelled> {
    let Some(found) = recognize(ctx)? else {
        return Ok(Outcome::NoMatch);
    };
    ctx.cancel.check()?;
    let Some(fragment) = synthesize(&found, &ctx.document.root) else {
        debug!(provider = ID, shape = ?found.shape, "match could not be synthesized");
        return Ok(Outcome::NoMatch);
    };

    debug!(provider = ID, shape = ?found.shape, occurrences = found.occurrences.len(), "offering rewrite");
    let action = CodeAction::new(ID, found.keyword, Severity::Info, TITLE, move |doc: &Document| fragment.apply(doc));
    Ok(Outcome::Actions(vec![action]))
}
