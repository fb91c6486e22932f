//! Recognition of the `if (e is T) { ... (T)e ... }` idiom.
//!
//! Starting at the `is` expression under the cursor, the recognizer climbs
//! to the enclosing `if` condition while tracking what the truth of each
//! enclosing sub-expression says about the test. That decides which parts of
//! the condition and which statements run only when `e` is a `T`; those are
//! the regions scanned for casts to replace.

use tracing::{debug, trace};

use crate::cancel::CheckBudget;
use crate::diagnostics::Cancelled;
use crate::parser::ast::*;
use crate::refactor::equivalence::{conversion_parts, equivalent, is_pure_path, root_name, same_type};
use crate::refactor::trigger::find_trigger;
use crate::refactor::RefactoringContext;
use crate::span::{Span, Spanned};
use crate::syntax::{node_at, Located, NodePath, NodeRef, SyntaxKind};
use crate::visit::composers::{contains_stmt, stmt_contains_expr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// The condition holds when the test does: `bar != null`.
    Positive,
    /// An odd number of `!` wrap the test: `bar == null`.
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    SimplePositive,
    SimpleNegative,
    IfElse,
    ElseIf,
    Compound,
}

/// Where the new binding declaration goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertionSite {
    /// Before statement `index` of the block at `block`.
    Block { block: NodePath, index: usize },
    /// The `if` is an embedded statement and gets wrapped in a new block.
    Embedded { stmt: NodePath },
}

/// Everything the synthesizer needs, as paths into the analysed tree.
#[derive(Debug, Clone, PartialEq)]
pub struct NullCheckMatch {
    /// Span of the `is` keyword.
    pub keyword: Span,
    pub tested: NodePath,
    pub target_type: NodePath,
    pub if_stmt: NodePath,
    /// The test plus any parentheses and `!` wrapped directly around it.
    pub replaced: NodePath,
    pub polarity: Polarity,
    pub shape: Shape,
    pub site: InsertionSite,
    /// Cast occurrences to swap for the binding, in evaluation order.
    pub occurrences: Vec<NodePath>,
    pub method: NodePath,
}

/// What the truth value of a sub-expression says about the type test.
#[derive(Debug, Clone, Copy)]
struct Implies {
    when_true: bool,
    when_false: bool,
}

struct Climb<'a> {
    if_stmt: Located<'a>,
    replaced: NodePath,
    negations: usize,
    facts: Implies,
    compound: bool,
    guarded_operands: Vec<NodePath>,
}

fn climb<'a>(test: &Located<'a>) -> Option<Climb<'a>> {
    let mut current = test.clone();
    let mut replaced = test.path.clone();
    let mut negations = 0;
    let mut absorbing = true;
    let mut compound = false;
    let mut facts = Implies { when_true: true, when_false: false };
    let mut guarded_operands = Vec::new();

    loop {
        let parent = current.parent()?;
        let from_lhs = current.path.last_index() == Some(0);
        let node = parent.node;
        match node {
            NodeRef::Expr(expr) => match &expr.node {
                Expr::Paren(_) => {
                    if absorbing {
                        replaced = parent.path.clone();
                    }
                }
                Expr::Unary { op: UnaryOp::Not, .. } => {
                    facts = Implies { when_true: facts.when_false, when_false: facts.when_true };
                    if absorbing {
                        replaced = parent.path.clone();
                        negations += 1;
                    }
                }
                Expr::Binary { op: BinOp::And, .. } => {
                    absorbing = false;
                    compound = true;
                    if from_lhs && facts.when_true {
                        guarded_operands.push(parent.path.child(1));
                    }
                    facts.when_false = false;
                }
                Expr::Binary { op: BinOp::Or, .. } => {
                    absorbing = false;
                    compound = true;
                    if from_lhs && facts.when_false {
                        guarded_operands.push(parent.path.child(1));
                    }
                    facts.when_true = false;
                }
                _ => {
                    trace!(kind = %node.kind(), "test sits under a non-logical expression");
                    return None;
                }
            },
            NodeRef::Stmt(Spanned { node: Stmt::If { .. }, .. }) if from_lhs => {
                return Some(Climb { if_stmt: parent, replaced, negations, facts, compound, guarded_operands });
            }
            other => {
                trace!(kind = %other.kind(), "test is not part of an if condition");
                return None;
            }
        }
        current = parent;
    }
}

/// Whether control never falls out of the end of `stmt`.
pub fn always_exits(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Return(_) | Stmt::Throw(_) | Stmt::Break | Stmt::Continue => true,
        Stmt::Block(block) => block.stmts.last().is_some_and(|s| always_exits(&s.node)),
        Stmt::If { then_branch, else_branch: Some(else_branch), .. } => {
            always_exits(&then_branch.node) && always_exits(&else_branch.node)
        }
        _ => false,
    }
}

pub fn recognize(ctx: &RefactoringContext<'_>) -> Result<Option<NullCheckMatch>, Cancelled> {
    let unit = &ctx.document.root;
    let Some(test) = find_trigger(unit, ctx.span, SyntaxKind::IsExpr) else {
        return Ok(None);
    };
    let Some(Spanned { node: Expr::Is { expr: tested, keyword, ty }, .. }) = test.node.as_expr() else {
        return Ok(None);
    };
    let tested: &Spanned<Expr> = tested;

    match ctx.model.resolve_type(&ty.node) {
        Some(target) if !ctx.model.is_value_type(&target) => {}
        Some(target) => {
            trace!(ty = %target.name, "target is a value type");
            return Ok(None);
        }
        None => {
            debug!("target type does not resolve");
            return Ok(None);
        }
    }
    match ctx.model.type_of_expr(tested) {
        Some(info) if !ctx.model.is_value_type(&info) => {}
        _ => {
            debug!("tested expression has no reference type");
            return Ok(None);
        }
    }

    let Some(climb) = climb(&test) else { return Ok(None) };
    let if_loc = &climb.if_stmt;
    let Some(Stmt::If { then_branch, else_branch, .. }) = if_loc.node.as_stmt().map(|s| &s.node) else {
        return Ok(None);
    };
    let Some(method) = if_loc.enclosing(SyntaxKind::MethodDecl) else {
        debug!("if statement outside a method body");
        return Ok(None);
    };
    let Some(if_parent) = if_loc.parent() else { return Ok(None) };
    let Some(if_index) = if_loc.path.last_index() else { return Ok(None) };

    let site = match (if_parent.node.block_stmts(), if_parent.node) {
        (Some(_), _) => InsertionSite::Block { block: if_parent.path.clone(), index: if_index },
        (None, NodeRef::Stmt(_)) => InsertionSite::Embedded { stmt: if_loc.path.clone() },
        (None, other) => {
            debug!(kind = %other.kind(), "malformed insertion site");
            return Ok(None);
        }
    };

    let polarity = if climb.negations % 2 == 0 { Polarity::Positive } else { Polarity::Negative };
    let is_else_if = matches!(if_parent.node, NodeRef::Stmt(Spanned { node: Stmt::If { .. }, .. })) && if_index == 2;
    let shape = if climb.compound {
        Shape::Compound
    } else if is_else_if {
        Shape::ElseIf
    } else if else_branch.is_some() {
        Shape::IfElse
    } else if polarity == Polarity::Negative {
        Shape::SimpleNegative
    } else {
        Shape::SimplePositive
    };

    let facts = climb.facts;
    let mut regions = climb.guarded_operands.clone();
    if facts.when_true {
        regions.push(if_loc.path.child(1));
    }
    if facts.when_false && else_branch.is_some() {
        regions.push(if_loc.path.child(2));
    }
    let failing_exits = if facts.when_true {
        else_branch.as_ref().is_some_and(|e| always_exits(&e.node))
    } else if facts.when_false {
        always_exits(&then_branch.node)
    } else {
        false
    };
    if let (true, InsertionSite::Block { block, index }) = (failing_exits, &site) {
        let count = if_parent.node.block_stmts().map_or(0, <[_]>::len);
        regions.extend((index + 1..count).map(|i| block.child(i)));
    }

    let occurrences = if is_pure_path(tested) {
        let mut scan = OccurrenceScan {
            tested,
            target: &ty.node,
            root: root_name(tested),
            budget: CheckBudget::new(ctx.cancel, ctx.config.scan.check_interval),
            found: Vec::new(),
            tainted: false,
        };
        for region in &regions {
            let Some(node) = node_at(unit, region.as_slice()) else { continue };
            scan.scan(node, region.clone())?;
        }
        scan.found
    } else {
        trace!("tested expression is not a pure path; casts left alone");
        Vec::new()
    };

    Ok(Some(NullCheckMatch {
        keyword: *keyword,
        tested: test.path.child(0),
        target_type: test.path.child(1),
        if_stmt: if_loc.path.clone(),
        replaced: climb.replaced,
        polarity,
        shape,
        site,
        occurrences,
        method: method.path,
    }))
}

/// Walks guarded regions in evaluation order collecting casts of the tested
/// expression. The first reassignment taints everything after it.
struct OccurrenceScan<'a, 'c> {
    tested: &'a Spanned<Expr>,
    target: &'a TypeExpr,
    root: Option<&'a str>,
    budget: CheckBudget<'c>,
    found: Vec<NodePath>,
    tainted: bool,
}

impl OccurrenceScan<'_, '_> {
    fn scan(&mut self, node: NodeRef<'_>, path: NodePath) -> Result<(), Cancelled> {
        if self.tainted {
            return Ok(());
        }
        self.budget.tick()?;

        if let NodeRef::Expr(expr) = node {
            if self.is_occurrence(expr) {
                self.found.push(path);
                return Ok(());
            }
        }
        if let NodeRef::Stmt(stmt) = node {
            if is_loop(&stmt.node) && self.loop_reassigns(stmt) {
                trace!(start = stmt.span.start, "loop reassigns the tested expression");
                self.tainted = true;
                return Ok(());
            }
        }

        for (index, child) in node.children().into_iter().enumerate() {
            self.scan(child, path.child(index))?;
            if self.tainted {
                return Ok(());
            }
        }
        // Post-order: `foo = (Bar)foo` still rewrites the right-hand side.
        if self.reassigns(node) {
            trace!(start = node.span().start, "tested expression reassigned");
            self.tainted = true;
        }
        Ok(())
    }

    fn is_occurrence(&self, expr: &Spanned<Expr>) -> bool {
        conversion_parts(expr).is_some_and(|(ty, operand)| same_type(ty, self.target) && equivalent(operand, self.tested))
    }

    /// A write to the tested path or to any object along it: with `a.b.c`
    /// tested, `a.b = x` changes what `a.b.c` denotes.
    fn writes_tested(&self, target: &Spanned<Expr>) -> bool {
        let mut prefix = strip_parens(self.tested);
        loop {
            if equivalent(target, prefix) {
                return true;
            }
            match &prefix.node {
                Expr::Member { object, .. } => prefix = strip_parens(object),
                _ => break,
            }
        }
        let written = match &strip_parens(target).node {
            Expr::Ident(name) => Some(ident_value(name)),
            Expr::Member { object, name } if matches!(strip_parens(object).node, Expr::This) => {
                Some(ident_value(&name.node))
            }
            _ => None,
        };
        written.is_some() && written == self.root
    }

    fn mutates(&self, expr: &Expr) -> bool {
        match expr {
            Expr::Assign { target, .. } => self.writes_tested(target),
            Expr::Postfix { operand, .. }
            | Expr::Unary { op: UnaryOp::PreIncrement | UnaryOp::PreDecrement, operand } => {
                self.writes_tested(operand)
            }
            _ => false,
        }
    }

    fn declares_root(&self, stmt: &Stmt) -> bool {
        match stmt {
            Stmt::Local { name, .. } | Stmt::Foreach { name, .. } => Some(ident_value(&name.node)) == self.root,
            _ => false,
        }
    }

    fn reassigns(&self, node: NodeRef<'_>) -> bool {
        match node {
            NodeRef::Expr(expr) => self.mutates(&expr.node),
            NodeRef::Stmt(stmt) => self.declares_root(&stmt.node),
            _ => false,
        }
    }

    fn loop_reassigns(&self, stmt: &Spanned<Stmt>) -> bool {
        contains_stmt(stmt, |s| self.declares_root(s)) || stmt_contains_expr(stmt, |e| self.mutates(e))
    }
}

fn is_loop(stmt: &Stmt) -> bool {
    matches!(stmt, Stmt::While { .. } | Stmt::For { .. } | Stmt::Foreach { .. })
}
