//! AST visitor pattern infrastructure
//!
//! Two visitor traits and corresponding walk functions for traversing the
//! node model:
//!
//! - `Visitor`: immutable reference traversal (analysis and collection)
//! - `VisitMut`: mutable reference traversal (in-place rewriting of a cloned tree)
//!
//! ## Usage
//!
//! Implement the visitor trait for your pass, overriding only the methods you need.
//! Call the corresponding `walk_*` function inside your override to get default recursion.
//!
//! ```rust
//! use refactorkit::visit::{Visitor, walk_expr};
//! use refactorkit::parser::ast::Expr;
//! use refactorkit::span::Spanned;
//! use std::collections::HashSet;
//!
//! struct IdentCollector {
//!     names: HashSet<String>,
//! }
//!
//! impl Visitor for IdentCollector {
//!     fn visit_expr(&mut self, expr: &Spanned<Expr>) {
//!         if let Expr::Ident(name) = &expr.node {
//!             self.names.insert(name.clone());
//!         }
//!         walk_expr(self, expr); // Continue recursion
//!     }
//! }
//! ```

pub mod composers;
pub mod scope_tracker;

use crate::parser::ast::*;
use crate::span::Spanned;

// ============================================================================
// Visitor Trait (Read-Only)
// ============================================================================

/// Read-only AST visitor. Default implementations recurse into all children.
///
/// Omit the walk call in an override to prune traversal at that node.
pub trait Visitor: Sized {
    fn visit_unit(&mut self, unit: &CompilationUnit) {
        walk_unit(self, unit);
    }

    fn visit_type_decl(&mut self, decl: &Spanned<TypeDecl>) {
        walk_type_decl(self, decl);
    }

    fn visit_field(&mut self, field: &Spanned<FieldDecl>) {
        walk_field(self, field);
    }

    fn visit_method(&mut self, method: &Spanned<MethodDecl>) {
        walk_method(self, method);
    }

    fn visit_param(&mut self, param: &Spanned<Param>) {
        walk_param(self, param);
    }

    fn visit_block(&mut self, block: &Spanned<Block>) {
        walk_block(self, block);
    }

    fn visit_stmt(&mut self, stmt: &Spanned<Stmt>) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &Spanned<Expr>) {
        walk_expr(self, expr);
    }

    fn visit_type_expr(&mut self, _te: &Spanned<TypeExpr>) {}
}

// ============================================================================
// Walk Functions (Read-Only)
// ============================================================================

pub fn walk_unit<V: Visitor>(v: &mut V, unit: &CompilationUnit) {
    for decl in &unit.types {
        v.visit_type_decl(decl);
    }
}

pub fn walk_type_decl<V: Visitor>(v: &mut V, decl: &Spanned<TypeDecl>) {
    for base in &decl.node.bases {
        v.visit_type_expr(base);
    }
    for field in &decl.node.fields {
        v.visit_field(field);
    }
    for method in &decl.node.methods {
        v.visit_method(method);
    }
}

pub fn walk_field<V: Visitor>(v: &mut V, field: &Spanned<FieldDecl>) {
    v.visit_type_expr(&field.node.ty);
    if let Some(init) = &field.node.init {
        v.visit_expr(init);
    }
}

pub fn walk_method<V: Visitor>(v: &mut V, method: &Spanned<MethodDecl>) {
    if let Some(ret) = &method.node.return_type {
        v.visit_type_expr(ret);
    }
    for param in &method.node.params {
        v.visit_param(param);
    }
    if let Some(body) = &method.node.body {
        v.visit_block(body);
    }
}

pub fn walk_param<V: Visitor>(v: &mut V, param: &Spanned<Param>) {
    v.visit_type_expr(&param.node.ty);
}

pub fn walk_block<V: Visitor>(v: &mut V, block: &Spanned<Block>) {
    for stmt in &block.node.stmts {
        v.visit_stmt(stmt);
    }
}

pub fn walk_stmt<V: Visitor>(v: &mut V, stmt: &Spanned<Stmt>) {
    match &stmt.node {
        Stmt::Local { ty, init, .. } => {
            v.visit_type_expr(ty);
            if let Some(init) = init {
                v.visit_expr(init);
            }
        }
        Stmt::Expr(expr) => v.visit_expr(expr),
        Stmt::Return(value) | Stmt::Throw(value) => {
            if let Some(value) = value {
                v.visit_expr(value);
            }
        }
        Stmt::Break | Stmt::Continue | Stmt::Empty => {}
        Stmt::Block(block) => {
            for s in &block.stmts {
                v.visit_stmt(s);
            }
        }
        Stmt::If {
            condition,
            then_branch,
            else_branch,
        } => {
            v.visit_expr(condition);
            v.visit_stmt(then_branch);
            if let Some(else_branch) = else_branch {
                v.visit_stmt(else_branch);
            }
        }
        Stmt::While { condition, body } => {
            v.visit_expr(condition);
            v.visit_stmt(body);
        }
        Stmt::For {
            init,
            condition,
            update,
            body,
        } => {
            if let Some(init) = init {
                v.visit_stmt(init);
            }
            if let Some(cond) = condition {
                v.visit_expr(cond);
            }
            for u in update {
                v.visit_expr(u);
            }
            v.visit_stmt(body);
        }
        Stmt::Foreach {
            ty, iterable, body, ..
        } => {
            v.visit_type_expr(ty);
            v.visit_expr(iterable);
            v.visit_stmt(body);
        }
    }
}

pub fn walk_expr<V: Visitor>(v: &mut V, expr: &Spanned<Expr>) {
    match &expr.node {
        Expr::Ident(_)
        | Expr::IntLit(_)
        | Expr::StringLit(_)
        | Expr::BoolLit(_)
        | Expr::Null
        | Expr::This => {}
        Expr::Paren(inner) => v.visit_expr(inner),
        Expr::Unary { operand, .. } | Expr::Postfix { operand, .. } => v.visit_expr(operand),
        Expr::Binary { lhs, rhs, .. } => {
            v.visit_expr(lhs);
            v.visit_expr(rhs);
        }
        Expr::Assign { target, value, .. } => {
            v.visit_expr(target);
            v.visit_expr(value);
        }
        Expr::Is { expr: inner, ty, .. } | Expr::As { expr: inner, ty } => {
            v.visit_expr(inner);
            v.visit_type_expr(ty);
        }
        Expr::Cast { ty, expr: inner } => {
            v.visit_type_expr(ty);
            v.visit_expr(inner);
        }
        Expr::Member { object, .. } => v.visit_expr(object),
        Expr::Call { callee, args } => {
            v.visit_expr(callee);
            for arg in args {
                v.visit_expr(arg);
            }
        }
        Expr::New { ty, args } => {
            v.visit_type_expr(ty);
            for arg in args {
                v.visit_expr(arg);
            }
        }
    }
}

// ============================================================================
// VisitMut Trait (Mutable)
// ============================================================================

/// Mutable AST visitor. Default implementations recurse into all children.
pub trait VisitMut: Sized {
    fn visit_unit_mut(&mut self, unit: &mut CompilationUnit) {
        walk_unit_mut(self, unit);
    }

    fn visit_type_decl_mut(&mut self, decl: &mut Spanned<TypeDecl>) {
        walk_type_decl_mut(self, decl);
    }

    fn visit_method_mut(&mut self, method: &mut Spanned<MethodDecl>) {
        walk_method_mut(self, method);
    }

    fn visit_block_mut(&mut self, block: &mut Spanned<Block>) {
        walk_block_mut(self, block);
    }

    fn visit_stmt_mut(&mut self, stmt: &mut Spanned<Stmt>) {
        walk_stmt_mut(self, stmt);
    }

    fn visit_expr_mut(&mut self, expr: &mut Spanned<Expr>) {
        walk_expr_mut(self, expr);
    }
}

// ============================================================================
// Walk Functions (Mutable)
// ============================================================================

pub fn walk_unit_mut<V: VisitMut>(v: &mut V, unit: &mut CompilationUnit) {
    for decl in &mut unit.types {
        v.visit_type_decl_mut(decl);
    }
}

pub fn walk_type_decl_mut<V: VisitMut>(v: &mut V, decl: &mut Spanned<TypeDecl>) {
    for field in &mut decl.node.fields {
        if let Some(init) = &mut field.node.init {
            v.visit_expr_mut(init);
        }
    }
    for method in &mut decl.node.methods {
        v.visit_method_mut(method);
    }
}

pub fn walk_method_mut<V: VisitMut>(v: &mut V, method: &mut Spanned<MethodDecl>) {
    if let Some(body) = &mut method.node.body {
        v.visit_block_mut(body);
    }
}

pub fn walk_block_mut<V: VisitMut>(v: &mut V, block: &mut Spanned<Block>) {
    for stmt in &mut block.node.stmts {
        v.visit_stmt_mut(stmt);
    }
}

pub fn walk_stmt_mut<V: VisitMut>(v: &mut V, stmt: &mut Spanned<Stmt>) {
    match &mut stmt.node {
        Stmt::Local { init, .. } => {
            if let Some(init) = init {
                v.visit_expr_mut(init);
            }
        }
        Stmt::Expr(expr) => v.visit_expr_mut(expr),
        Stmt::Return(value) | Stmt::Throw(value) => {
            if let Some(value) = value {
                v.visit_expr_mut(value);
            }
        }
        Stmt::Break | Stmt::Continue | Stmt::Empty => {}
        Stmt::Block(block) => {
            for s in &mut block.stmts {
                v.visit_stmt_mut(s);
            }
        }
        Stmt::If {
            condition,
            then_branch,
            else_branch,
        } => {
            v.visit_expr_mut(condition);
            v.visit_stmt_mut(then_branch);
            if let Some(else_branch) = else_branch {
                v.visit_stmt_mut(else_branch);
            }
        }
        Stmt::While { condition, body } => {
            v.visit_expr_mut(condition);
            v.visit_stmt_mut(body);
        }
        Stmt::For {
            init,
            condition,
            update,
            body,
        } => {
            if let Some(init) = init {
                v.visit_stmt_mut(init);
            }
            if let Some(cond) = condition {
                v.visit_expr_mut(cond);
            }
            for u in update {
                v.visit_expr_mut(u);
            }
            v.visit_stmt_mut(body);
        }
        Stmt::Foreach { iterable, body, .. } => {
            v.visit_expr_mut(iterable);
            v.visit_stmt_mut(body);
        }
    }
}

pub fn walk_expr_mut<V: VisitMut>(v: &mut V, expr: &mut Spanned<Expr>) {
    match &mut expr.node {
        Expr::Ident(_)
        | Expr::IntLit(_)
        | Expr::StringLit(_)
        | Expr::BoolLit(_)
        | Expr::Null
        | Expr::This => {}
        Expr::Paren(inner) => v.visit_expr_mut(inner),
        Expr::Unary { operand, .. } | Expr::Postfix { operand, .. } => v.visit_expr_mut(operand),
        Expr::Binary { lhs, rhs, .. } => {
            v.visit_expr_mut(lhs);
            v.visit_expr_mut(rhs);
        }
        Expr::Assign { target, value, .. } => {
            v.visit_expr_mut(target);
            v.visit_expr_mut(value);
        }
        Expr::Is { expr: inner, .. } | Expr::As { expr: inner, .. } | Expr::Cast { expr: inner, .. } => {
            v.visit_expr_mut(inner)
        }
        Expr::Member { object, .. } => v.visit_expr_mut(object),
        Expr::Call { callee, args } => {
            v.visit_expr_mut(callee);
            for arg in args {
                v.visit_expr_mut(arg);
            }
        }
        Expr::New { args, .. } => {
            for arg in args {
                v.visit_expr_mut(arg);
            }
        }
    }
}
