//! Uniform view over the typed node model.
//!
//! `NodeRef` exposes every node with its span, kind and ordered children so
//! trigger matching and ancestor walks do not need one match arm per type.
//! A `NodePath` is the list of child indices from the compilation unit down
//! to a node; `replace_at` rebuilds a tree with the node at a path swapped.

use crate::parser::ast::*;
use crate::span::{Span, Spanned};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyntaxKind {
    CompilationUnit,
    UsingDirective,
    TypeDecl,
    FieldDecl,
    MethodDecl,
    Parameter,
    Type,
    Block,
    // statements
    LocalDecl,
    ExprStmt,
    Return,
    Throw,
    Break,
    Continue,
    Empty,
    BlockStmt,
    If,
    While,
    For,
    Foreach,
    // expressions
    Ident,
    Literal,
    This,
    Paren,
    Unary,
    Postfix,
    Binary,
    Assign,
    IsExpr,
    AsExpr,
    Cast,
    Member,
    Call,
    New,
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Borrowed view of any node in a compilation unit.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Unit(&'a CompilationUnit),
    Using(&'a Spanned<UsingDirective>),
    Type(&'a Spanned<TypeDecl>),
    Field(&'a Spanned<FieldDecl>),
    Method(&'a Spanned<MethodDecl>),
    Param(&'a Spanned<Param>),
    TypeExpr(&'a Spanned<TypeExpr>),
    Block(&'a Spanned<Block>),
    Stmt(&'a Spanned<Stmt>),
    Expr(&'a Spanned<Expr>),
}

impl<'a> NodeRef<'a> {
    pub fn span(&self) -> Span {
        match self {
            NodeRef::Unit(u) => u.span,
            NodeRef::Using(n) => n.span,
            NodeRef::Type(n) => n.span,
            NodeRef::Field(n) => n.span,
            NodeRef::Method(n) => n.span,
            NodeRef::Param(n) => n.span,
            NodeRef::TypeExpr(n) => n.span,
            NodeRef::Block(n) => n.span,
            NodeRef::Stmt(n) => n.span,
            NodeRef::Expr(n) => n.span,
        }
    }

    pub fn kind(&self) -> SyntaxKind {
        match self {
            NodeRef::Unit(_) => SyntaxKind::CompilationUnit,
            NodeRef::Using(_) => SyntaxKind::UsingDirective,
            NodeRef::Type(_) => SyntaxKind::TypeDecl,
            NodeRef::Field(_) => SyntaxKind::FieldDecl,
            NodeRef::Method(_) => SyntaxKind::MethodDecl,
            NodeRef::Param(_) => SyntaxKind::Parameter,
            NodeRef::TypeExpr(_) => SyntaxKind::Type,
            NodeRef::Block(_) => SyntaxKind::Block,
            NodeRef::Stmt(s) => match &s.node {
                Stmt::Local { .. } => SyntaxKind::LocalDecl,
                Stmt::Expr(_) => SyntaxKind::ExprStmt,
                Stmt::Return(_) => SyntaxKind::Return,
                Stmt::Throw(_) => SyntaxKind::Throw,
                Stmt::Break => SyntaxKind::Break,
                Stmt::Continue => SyntaxKind::Continue,
                Stmt::Empty => SyntaxKind::Empty,
                Stmt::Block(_) => SyntaxKind::BlockStmt,
                Stmt::If { .. } => SyntaxKind::If,
                Stmt::While { .. } => SyntaxKind::While,
                Stmt::For { .. } => SyntaxKind::For,
                Stmt::Foreach { .. } => SyntaxKind::Foreach,
            },
            NodeRef::Expr(e) => match &e.node {
                Expr::Ident(_) => SyntaxKind::Ident,
                Expr::IntLit(_) | Expr::StringLit(_) | Expr::BoolLit(_) | Expr::Null => SyntaxKind::Literal,
                Expr::This => SyntaxKind::This,
                Expr::Paren(_) => SyntaxKind::Paren,
                Expr::Unary { .. } => SyntaxKind::Unary,
                Expr::Postfix { .. } => SyntaxKind::Postfix,
                Expr::Binary { .. } => SyntaxKind::Binary,
                Expr::Assign { .. } => SyntaxKind::Assign,
                Expr::Is { .. } => SyntaxKind::IsExpr,
                Expr::As { .. } => SyntaxKind::AsExpr,
                Expr::Cast { .. } => SyntaxKind::Cast,
                Expr::Member { .. } => SyntaxKind::Member,
                Expr::Call { .. } => SyntaxKind::Call,
                Expr::New { .. } => SyntaxKind::New,
            },
        }
    }

    /// Children in source order.
    pub fn children(&self) -> Vec<NodeRef<'a>> {
        let mut out = Vec::new();
        match *self {
            NodeRef::Unit(u) => {
                out.extend(u.usings.iter().map(NodeRef::Using));
                out.extend(u.types.iter().map(NodeRef::Type));
            }
            NodeRef::Using(_) | NodeRef::TypeExpr(_) => {}
            NodeRef::Type(t) => {
                out.extend(t.node.bases.iter().map(NodeRef::TypeExpr));
                out.extend(t.node.fields.iter().map(NodeRef::Field));
                out.extend(t.node.methods.iter().map(NodeRef::Method));
            }
            NodeRef::Field(f) => {
                out.push(NodeRef::TypeExpr(&f.node.ty));
                out.extend(f.node.init.iter().map(NodeRef::Expr));
            }
            NodeRef::Method(m) => {
                out.extend(m.node.return_type.iter().map(NodeRef::TypeExpr));
                out.extend(m.node.params.iter().map(NodeRef::Param));
                out.extend(m.node.body.iter().map(NodeRef::Block));
            }
            NodeRef::Param(p) => out.push(NodeRef::TypeExpr(&p.node.ty)),
            NodeRef::Block(b) => out.extend(b.node.stmts.iter().map(NodeRef::Stmt)),
            NodeRef::Stmt(s) => match &s.node {
                Stmt::Local { ty, init, .. } => {
                    out.push(NodeRef::TypeExpr(ty));
                    out.extend(init.iter().map(NodeRef::Expr));
                }
                Stmt::Expr(e) => out.push(NodeRef::Expr(e)),
                Stmt::Return(v) | Stmt::Throw(v) => out.extend(v.iter().map(NodeRef::Expr)),
                Stmt::Break | Stmt::Continue | Stmt::Empty => {}
                Stmt::Block(b) => out.extend(b.stmts.iter().map(NodeRef::Stmt)),
                Stmt::If { condition, then_branch, else_branch } => {
                    out.push(NodeRef::Expr(condition));
                    out.push(NodeRef::Stmt(then_branch));
                    out.extend(else_branch.iter().map(|e| NodeRef::Stmt(e)));
                }
                Stmt::While { condition, body } => {
                    out.push(NodeRef::Expr(condition));
                    out.push(NodeRef::Stmt(body));
                }
                Stmt::For { init, condition, update, body } => {
                    out.extend(init.iter().map(|i| NodeRef::Stmt(i)));
                    out.extend(condition.iter().map(NodeRef::Expr));
                    out.extend(update.iter().map(NodeRef::Expr));
                    out.push(NodeRef::Stmt(body));
                }
                Stmt::Foreach { ty, iterable, body, .. } => {
                    out.push(NodeRef::TypeExpr(ty));
                    out.push(NodeRef::Expr(iterable));
                    out.push(NodeRef::Stmt(body));
                }
            },
            NodeRef::Expr(e) => match &e.node {
                Expr::Ident(_)
                | Expr::IntLit(_)
                | Expr::StringLit(_)
                | Expr::BoolLit(_)
                | Expr::Null
                | Expr::This => {}
                Expr::Paren(inner) => out.push(NodeRef::Expr(inner)),
                Expr::Unary { operand, .. } | Expr::Postfix { operand, .. } => out.push(NodeRef::Expr(operand)),
                Expr::Binary { lhs, rhs, .. } => {
                    out.push(NodeRef::Expr(lhs));
                    out.push(NodeRef::Expr(rhs));
                }
                Expr::Assign { target, value, .. } => {
                    out.push(NodeRef::Expr(target));
                    out.push(NodeRef::Expr(value));
                }
                Expr::Is { expr, ty, .. } | Expr::As { expr, ty } => {
                    out.push(NodeRef::Expr(expr));
                    out.push(NodeRef::TypeExpr(ty));
                }
                Expr::Cast { ty, expr } => {
                    out.push(NodeRef::TypeExpr(ty));
                    out.push(NodeRef::Expr(expr));
                }
                Expr::Member { object, .. } => out.push(NodeRef::Expr(object)),
                Expr::Call { callee, args } => {
                    out.push(NodeRef::Expr(callee));
                    out.extend(args.iter().map(NodeRef::Expr));
                }
                Expr::New { ty, args } => {
                    out.push(NodeRef::TypeExpr(ty));
                    out.extend(args.iter().map(NodeRef::Expr));
                }
            },
        }
        out
    }

    pub fn as_expr(&self) -> Option<&'a Spanned<Expr>> {
        match *self {
            NodeRef::Expr(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_stmt(&self) -> Option<&'a Spanned<Stmt>> {
        match *self {
            NodeRef::Stmt(s) => Some(s),
            _ => None,
        }
    }

    /// Statement list if this node is a block (method body or block statement).
    pub fn block_stmts(&self) -> Option<&'a [Spanned<Stmt>]> {
        match *self {
            NodeRef::Block(b) => Some(&b.node.stmts),
            NodeRef::Stmt(Spanned { node: Stmt::Block(b), .. }) => Some(&b.stmts),
            _ => None,
        }
    }
}

/// Child-index path from the compilation unit to a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
pub struct NodePath(pub Vec<usize>);

impl NodePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn child(&self, index: usize) -> Self {
        let mut path = self.0.clone();
        path.push(index);
        Self(path)
    }

    pub fn parent(&self) -> Option<NodePath> {
        let (_, rest) = self.0.split_last()?;
        Some(Self(rest.to_vec()))
    }

    pub fn last_index(&self) -> Option<usize> {
        self.0.last().copied()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A node together with its path and the chain of ancestors above it.
#[derive(Debug, Clone)]
pub struct Located<'a> {
    pub node: NodeRef<'a>,
    pub path: NodePath,
    /// Root first, immediate parent last.
    pub ancestors: Vec<NodeRef<'a>>,
}

impl<'a> Located<'a> {
    pub fn parent(&self) -> Option<Located<'a>> {
        let node = *self.ancestors.last()?;
        let path = self.path.parent()?;
        let ancestors = self.ancestors[..self.ancestors.len() - 1].to_vec();
        Some(Located { node, path, ancestors })
    }

    /// Nearest enclosing node of the given kind, self excluded.
    pub fn enclosing(&self, kind: SyntaxKind) -> Option<Located<'a>> {
        let mut current = self.parent()?;
        loop {
            if current.node.kind() == kind {
                return Some(current);
            }
            current = current.parent()?;
        }
    }
}

/// Node at `path`, if the path is valid for this tree.
pub fn node_at<'a>(unit: &'a CompilationUnit, path: &[usize]) -> Option<NodeRef<'a>> {
    let mut node = NodeRef::Unit(unit);
    for &i in path {
        node = node.children().get(i).copied()?;
    }
    Some(node)
}

/// Locate the node at `path` with its ancestor chain.
pub fn locate<'a>(unit: &'a CompilationUnit, path: &NodePath) -> Option<Located<'a>> {
    let mut node = NodeRef::Unit(unit);
    let mut ancestors = Vec::with_capacity(path.len());
    for &i in path.as_slice() {
        let next = node.children().get(i).copied()?;
        ancestors.push(node);
        node = next;
    }
    Some(Located { node, path: path.clone(), ancestors })
}

/// Innermost node of `kind` whose span contains `cursor`.
///
/// Only descends into children that themselves contain the cursor, so
/// synthesized nodes with dummy spans are never matched.
pub fn find_innermost<'a>(unit: &'a CompilationUnit, cursor: Span, kind: SyntaxKind) -> Option<Located<'a>> {
    let root = NodeRef::Unit(unit);
    if !root.span().contains(cursor) {
        return None;
    }

    let mut best = None;
    let mut current = Located { node: root, path: NodePath::root(), ancestors: Vec::new() };
    loop {
        if current.node.kind() == kind {
            best = Some(current.clone());
        }
        let next = current
            .node
            .children()
            .into_iter()
            .enumerate()
            .find(|(_, child)| !child.span().is_synthesized() && child.span().contains(cursor));
        let Some((index, child)) = next else { break };
        let mut ancestors = current.ancestors;
        ancestors.push(current.node);
        current = Located { node: child, path: current.path.child(index), ancestors };
    }
    best
}

/// A subtree to splice in at a path.
#[derive(Debug, Clone, PartialEq)]
pub enum Replacement {
    Block(Spanned<Block>),
    Stmt(Spanned<Stmt>),
    Expr(Spanned<Expr>),
}

impl Replacement {
    pub fn describe(&self) -> &'static str {
        match self {
            Replacement::Block(_) => "block",
            Replacement::Stmt(_) => "statement",
            Replacement::Expr(_) => "expression",
        }
    }
}

/// Mutable counterpart of `NodeRef`, restricted to the nodes a rewrite can
/// target or pass through.
enum NodeMut<'a> {
    Unit(&'a mut CompilationUnit),
    Type(&'a mut Spanned<TypeDecl>),
    Field(&'a mut Spanned<FieldDecl>),
    Method(&'a mut Spanned<MethodDecl>),
    Block(&'a mut Spanned<Block>),
    Stmt(&'a mut Spanned<Stmt>),
    Expr(&'a mut Spanned<Expr>),
    /// Usings, parameters and type syntax: reachable by path, never rewritten.
    Leaf,
}

impl<'a> NodeMut<'a> {
    /// Child `index`, numbered exactly as `NodeRef::children`.
    fn child(self, index: usize) -> Option<NodeMut<'a>> {
        match self {
            NodeMut::Unit(u) => {
                if index < u.usings.len() {
                    return Some(NodeMut::Leaf);
                }
                u.types.get_mut(index - u.usings.len()).map(NodeMut::Type)
            }
            NodeMut::Type(t) => {
                let bases = t.node.bases.len();
                let fields = t.node.fields.len();
                if index < bases {
                    Some(NodeMut::Leaf)
                } else if index < bases + fields {
                    t.node.fields.get_mut(index - bases).map(NodeMut::Field)
                } else {
                    t.node.methods.get_mut(index - bases - fields).map(NodeMut::Method)
                }
            }
            NodeMut::Field(f) => match index {
                0 => Some(NodeMut::Leaf),
                1 => f.node.init.as_mut().map(NodeMut::Expr),
                _ => None,
            },
            NodeMut::Method(m) => {
                let method = &mut m.node;
                let mut i = index;
                if method.return_type.is_some() {
                    if i == 0 {
                        return Some(NodeMut::Leaf);
                    }
                    i -= 1;
                }
                if i < method.params.len() {
                    return Some(NodeMut::Leaf);
                }
                i -= method.params.len();
                if i == 0 { method.body.as_mut().map(NodeMut::Block) } else { None }
            }
            NodeMut::Block(b) => b.node.stmts.get_mut(index).map(NodeMut::Stmt),
            NodeMut::Stmt(s) => stmt_child(&mut s.node, index),
            NodeMut::Expr(e) => expr_child(&mut e.node, index),
            NodeMut::Leaf => None,
        }
    }

    fn replace(self, replacement: Replacement) -> Result<(), Replacement> {
        match (self, replacement) {
            (NodeMut::Block(slot), Replacement::Block(new)) => *slot = new,
            (NodeMut::Stmt(slot), Replacement::Stmt(new)) => *slot = new,
            (NodeMut::Expr(slot), Replacement::Expr(new)) => *slot = new,
            (_, replacement) => return Err(replacement),
        }
        Ok(())
    }
}

fn stmt_child(stmt: &mut Stmt, index: usize) -> Option<NodeMut<'_>> {
    match stmt {
        Stmt::Local { init, .. } => match index {
            0 => Some(NodeMut::Leaf),
            1 => init.as_mut().map(NodeMut::Expr),
            _ => None,
        },
        Stmt::Expr(e) => (index == 0).then_some(NodeMut::Expr(e)),
        Stmt::Return(v) | Stmt::Throw(v) => {
            if index == 0 { v.as_mut().map(NodeMut::Expr) } else { None }
        }
        Stmt::Break | Stmt::Continue | Stmt::Empty => None,
        Stmt::Block(b) => b.stmts.get_mut(index).map(NodeMut::Stmt),
        Stmt::If { condition, then_branch, else_branch } => match index {
            0 => Some(NodeMut::Expr(condition)),
            1 => Some(NodeMut::Stmt(then_branch)),
            2 => else_branch.as_mut().map(|e| NodeMut::Stmt(e)),
            _ => None,
        },
        Stmt::While { condition, body } => match index {
            0 => Some(NodeMut::Expr(condition)),
            1 => Some(NodeMut::Stmt(body)),
            _ => None,
        },
        Stmt::For { init, condition, update, body } => {
            let mut i = index;
            if let Some(init) = init {
                if i == 0 {
                    return Some(NodeMut::Stmt(init));
                }
                i -= 1;
            }
            if let Some(cond) = condition {
                if i == 0 {
                    return Some(NodeMut::Expr(cond));
                }
                i -= 1;
            }
            let updates = update.len();
            if i < updates {
                update.get_mut(i).map(NodeMut::Expr)
            } else {
                (i == updates).then_some(NodeMut::Stmt(body))
            }
        }
        Stmt::Foreach { iterable, body, .. } => match index {
            0 => Some(NodeMut::Leaf),
            1 => Some(NodeMut::Expr(iterable)),
            2 => Some(NodeMut::Stmt(body)),
            _ => None,
        },
    }
}

fn expr_child(expr: &mut Expr, index: usize) -> Option<NodeMut<'_>> {
    match expr {
        Expr::Ident(_) | Expr::IntLit(_) | Expr::StringLit(_) | Expr::BoolLit(_) | Expr::Null | Expr::This => None,
        Expr::Paren(inner) | Expr::Unary { operand: inner, .. } | Expr::Postfix { operand: inner, .. } => {
            (index == 0).then_some(NodeMut::Expr(inner))
        }
        Expr::Binary { lhs, rhs, .. } => match index {
            0 => Some(NodeMut::Expr(lhs)),
            1 => Some(NodeMut::Expr(rhs)),
            _ => None,
        },
        Expr::Assign { target, value, .. } => match index {
            0 => Some(NodeMut::Expr(target)),
            1 => Some(NodeMut::Expr(value)),
            _ => None,
        },
        Expr::Is { expr, .. } | Expr::As { expr, .. } => match index {
            0 => Some(NodeMut::Expr(expr)),
            1 => Some(NodeMut::Leaf),
            _ => None,
        },
        Expr::Cast { expr, .. } => match index {
            0 => Some(NodeMut::Leaf),
            1 => Some(NodeMut::Expr(expr)),
            _ => None,
        },
        Expr::Member { object, .. } => (index == 0).then_some(NodeMut::Expr(object)),
        Expr::Call { callee, args } => {
            if index == 0 { Some(NodeMut::Expr(callee)) } else { args.get_mut(index - 1).map(NodeMut::Expr) }
        }
        Expr::New { args, .. } => {
            if index == 0 { Some(NodeMut::Leaf) } else { args.get_mut(index - 1).map(NodeMut::Expr) }
        }
    }
}

/// Clone `unit` and splice `replacement` in at `path`.
///
/// Returns `None` when the path does not lead to a node of the replacement's
/// shape; the input tree is never modified.
pub fn replace_at(unit: &CompilationUnit, path: &[usize], replacement: Replacement) -> Option<CompilationUnit> {
    let mut result = unit.clone();
    let mut node = NodeMut::Unit(&mut result);
    for &i in path {
        node = node.child(i)?;
    }
    node.replace(replacement).ok()?;
    Some(result)
}
