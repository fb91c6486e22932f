//! Semantic facts consumed by the refactoring providers.
//!
//! `SemanticModel` is the seam to the analysis host. `SourceModel` is the
//! reference implementation: it indexes one compilation unit and answers
//! type questions from declarations alone.

use crate::parser::ast::*;
use crate::span::{Span, Spanned};
use crate::syntax::NodeRef;
use crate::visit::scope_tracker::ScopeTracker;
use crate::visit::{walk_expr, walk_stmt, Visitor};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCategory {
    Reference,
    Value,
}

/// A resolved type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    pub name: String,
    pub category: TypeCategory,
}

impl TypeInfo {
    pub fn reference(name: impl Into<String>) -> Self {
        Self { name: name.into(), category: TypeCategory::Reference }
    }

    pub fn value(name: impl Into<String>) -> Self {
        Self { name: name.into(), category: TypeCategory::Value }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Parameter,
    Local,
    Field,
}

/// A declared name and where it was declared.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub ty: TypeExpr,
    pub declared_at: Span,
}

/// Read-only semantic queries the engine makes of its host.
///
/// Every query may fail by returning `None`; callers treat that as
/// "no refactoring here".
pub trait SemanticModel: Send + Sync {
    /// Symbol declared by a parameter, local or field node.
    fn declared_symbol(&self, node: NodeRef<'_>) -> Option<Symbol>;

    fn type_of_symbol(&self, symbol: &Symbol) -> Option<TypeInfo>;

    /// Static type of an expression in the analysed tree.
    fn type_of_expr(&self, expr: &Spanned<Expr>) -> Option<TypeInfo>;

    fn resolve_type(&self, ty: &TypeExpr) -> Option<TypeInfo>;

    fn is_value_type(&self, ty: &TypeInfo) -> bool {
        ty.category == TypeCategory::Value
    }
}

const VALUE_PREDEFINED: &[&str] = &[
    "bool", "byte", "char", "decimal", "double", "float", "int", "long", "sbyte", "short", "uint", "ulong",
    "ushort",
];

const REFERENCE_PREDEFINED: &[&str] = &["object", "string"];

/// Framework types the reference host knows without declarations.
const WELL_KNOWN: &[(&str, TypeCategory)] = &[
    ("Object", TypeCategory::Reference),
    ("String", TypeCategory::Reference),
    ("Exception", TypeCategory::Reference),
    ("ArgumentNullException", TypeCategory::Reference),
    ("IDisposable", TypeCategory::Reference),
    ("IEnumerable", TypeCategory::Reference),
    ("Console", TypeCategory::Reference),
    ("Stream", TypeCategory::Reference),
    ("Int32", TypeCategory::Value),
    ("Int64", TypeCategory::Value),
    ("Boolean", TypeCategory::Value),
    ("Double", TypeCategory::Value),
    ("DateTime", TypeCategory::Value),
    ("TimeSpan", TypeCategory::Value),
    ("Guid", TypeCategory::Value),
];

#[derive(Debug, Clone)]
struct MethodInfo {
    span: Span,
    params: Vec<(String, TypeExpr, Span)>,
    body: Option<Spanned<Block>>,
}

#[derive(Debug, Clone, Default)]
struct TypeIndex {
    category: Option<TypeCategory>,
    fields: HashMap<String, (TypeExpr, Span)>,
    methods: HashMap<String, Option<TypeExpr>>,
    span: Span,
}

/// `SemanticModel` derived from a single compilation unit.
#[derive(Debug, Clone)]
pub struct SourceModel {
    types: HashMap<String, TypeIndex>,
    methods: Vec<MethodInfo>,
}

impl SourceModel {
    pub fn new(unit: &CompilationUnit) -> Self {
        let mut types: HashMap<String, TypeIndex> = HashMap::new();
        let mut methods = Vec::new();

        for decl in &unit.types {
            let d = &decl.node;
            let category = match d.kind {
                TypeDeclKind::Class | TypeDeclKind::Interface => TypeCategory::Reference,
                TypeDeclKind::Struct | TypeDeclKind::Enum => TypeCategory::Value,
            };
            let entry = types.entry(ident_value(&d.name.node).to_string()).or_default();
            entry.category = Some(category);
            entry.span = decl.span;

            for field in &d.fields {
                entry.fields.insert(
                    ident_value(&field.node.name.node).to_string(),
                    (field.node.ty.node.clone(), field.span),
                );
            }
            for method in &d.methods {
                let m = &method.node;
                entry.methods.insert(
                    ident_value(&m.name.node).to_string(),
                    m.return_type.as_ref().map(|t| t.node.clone()),
                );
                methods.push(MethodInfo {
                    span: method.span,
                    params: m
                        .params
                        .iter()
                        .map(|p| (ident_value(&p.node.name.node).to_string(), p.node.ty.node.clone(), p.span))
                        .collect(),
                    body: m.body.clone(),
                });
            }
        }

        Self { types, methods }
    }

    fn method_at(&self, span: Span) -> Option<&MethodInfo> {
        self.methods
            .iter()
            .filter(|m| m.span.contains(span))
            .min_by_key(|m| m.span.len())
    }

    fn owner_at(&self, span: Span) -> Option<(&str, &TypeIndex)> {
        self.types
            .iter()
            .filter(|(_, t)| t.span.contains(span) && !t.span.is_empty())
            .min_by_key(|(_, t)| t.span.len())
            .map(|(name, t)| (name.as_str(), t))
    }

    /// Type of the identifier expression `ident` (at `span`), looking at
    /// locals in scope, then parameters, then fields of the enclosing type.
    fn type_of_name(&self, name: &str, span: Span) -> Option<TypeInfo> {
        if let Some(method) = self.method_at(span) {
            if let Some(body) = &method.body {
                let mut lookup = LocalLookup {
                    target: span,
                    scopes: ScopeTracker::with_initial_scope(),
                    found: None,
                };
                lookup.visit_block(body);
                if let Some(Some(local)) = lookup.found {
                    return match local {
                        LocalType::Declared(ty) => self.resolve_type(&ty),
                        LocalType::Inferred(init) => self.type_of_expr(&init),
                    };
                }
            }
            if let Some((_, ty, _)) = method.params.iter().find(|(p, _, _)| p == ident_value(name)) {
                return self.resolve_type(ty);
            }
        }
        let (_, owner) = self.owner_at(span)?;
        let (ty, _) = owner.fields.get(ident_value(name))?;
        self.resolve_type(ty)
    }

    fn member_type(&self, owner: &str, name: &str) -> Option<TypeInfo> {
        let index = self.types.get(owner)?;
        let (ty, _) = index.fields.get(ident_value(name))?;
        self.resolve_type(ty)
    }

    fn method_return(&self, owner: &str, name: &str) -> Option<TypeInfo> {
        let index = self.types.get(owner)?;
        let ret = index.methods.get(ident_value(name))?.as_ref()?;
        self.resolve_type(ret)
    }
}

impl SemanticModel for SourceModel {
    fn declared_symbol(&self, node: NodeRef<'_>) -> Option<Symbol> {
        match node {
            NodeRef::Param(p) => Some(Symbol {
                name: ident_value(&p.node.name.node).to_string(),
                kind: SymbolKind::Parameter,
                ty: p.node.ty.node.clone(),
                declared_at: p.span,
            }),
            NodeRef::Stmt(Spanned { node: Stmt::Local { ty, name, init }, span }) => {
                let ty = match (&ty.node, init) {
                    (TypeExpr::Var, Some(init)) => {
                        TypeExpr::Named(self.type_of_expr(init)?.name)
                    }
                    (TypeExpr::Var, None) => return None,
                    (ty, _) => ty.clone(),
                };
                Some(Symbol {
                    name: ident_value(&name.node).to_string(),
                    kind: SymbolKind::Local,
                    ty,
                    declared_at: *span,
                })
            }
            NodeRef::Field(f) => Some(Symbol {
                name: ident_value(&f.node.name.node).to_string(),
                kind: SymbolKind::Field,
                ty: f.node.ty.node.clone(),
                declared_at: f.span,
            }),
            _ => None,
        }
    }

    fn type_of_symbol(&self, symbol: &Symbol) -> Option<TypeInfo> {
        self.resolve_type(&symbol.ty)
    }

    fn type_of_expr(&self, expr: &Spanned<Expr>) -> Option<TypeInfo> {
        match &expr.node {
            Expr::Ident(name) => self.type_of_name(name, expr.span),
            Expr::IntLit(_) => Some(TypeInfo::value("int")),
            Expr::StringLit(_) => Some(TypeInfo::reference("string")),
            Expr::BoolLit(_) => Some(TypeInfo::value("bool")),
            Expr::Null => None,
            Expr::This => {
                let (name, index) = self.owner_at(expr.span)?;
                Some(TypeInfo { name: name.to_string(), category: index.category? })
            }
            Expr::Paren(inner) => self.type_of_expr(inner),
            Expr::Unary { op: UnaryOp::Not, .. } => Some(TypeInfo::value("bool")),
            Expr::Unary { operand, .. } | Expr::Postfix { operand, .. } => self.type_of_expr(operand),
            Expr::Binary { op, lhs, rhs } => match op {
                BinOp::Or | BinOp::And | BinOp::Eq | BinOp::Neq | BinOp::Lt | BinOp::Gt | BinOp::LtEq
                | BinOp::GtEq => Some(TypeInfo::value("bool")),
                BinOp::Add => {
                    let l = self.type_of_expr(lhs);
                    let r = self.type_of_expr(rhs);
                    if [&l, &r].iter().any(|t| matches!(t, Some(t) if t.name == "string")) {
                        Some(TypeInfo::reference("string"))
                    } else {
                        l.or(r)
                    }
                }
                _ => self.type_of_expr(lhs),
            },
            Expr::Assign { target, .. } => self.type_of_expr(target),
            Expr::Is { .. } => Some(TypeInfo::value("bool")),
            Expr::As { ty, .. } | Expr::Cast { ty, .. } | Expr::New { ty, .. } => self.resolve_type(&ty.node),
            Expr::Member { object, name } => {
                let owner = self.type_of_expr(object)?;
                self.member_type(&owner.name, &name.node)
            }
            Expr::Call { callee, .. } => match &callee.node {
                Expr::Ident(name) => {
                    let (owner, _) = self.owner_at(expr.span)?;
                    self.method_return(owner, name)
                }
                Expr::Member { object, name } => {
                    let owner = self.type_of_expr(object)?;
                    self.method_return(&owner.name, &name.node)
                }
                _ => None,
            },
        }
    }

    fn resolve_type(&self, ty: &TypeExpr) -> Option<TypeInfo> {
        match ty {
            TypeExpr::Var => None,
            TypeExpr::Nullable(inner) => {
                let inner = self.resolve_type(inner)?;
                Some(TypeInfo::value(format!("{}?", inner.name)))
            }
            TypeExpr::Array(inner) => {
                let inner = self.resolve_type(inner)?;
                Some(TypeInfo::reference(format!("{}[]", inner.name)))
            }
            TypeExpr::Named(_) => {
                let simple = ty.simple_name()?;
                if VALUE_PREDEFINED.contains(&simple) {
                    return Some(TypeInfo::value(simple));
                }
                if REFERENCE_PREDEFINED.contains(&simple) {
                    return Some(TypeInfo::reference(simple));
                }
                if let Some(category) = self.types.get(simple).and_then(|t| t.category) {
                    return Some(TypeInfo { name: simple.to_string(), category });
                }
                WELL_KNOWN
                    .iter()
                    .find(|(name, _)| *name == simple)
                    .map(|(name, category)| TypeInfo { name: name.to_string(), category: *category })
            }
        }
    }
}

#[derive(Debug, Clone)]
enum LocalType {
    Declared(TypeExpr),
    Inferred(Spanned<Expr>),
}

/// Walks a method body tracking local scopes until it reaches the
/// identifier at `target`, then records what that name resolves to.
struct LocalLookup {
    target: Span,
    scopes: ScopeTracker<LocalType>,
    /// `Some(None)`: reached the target, name is not a local.
    found: Option<Option<LocalType>>,
}

impl LocalLookup {
    fn declare(&mut self, ty: &Spanned<TypeExpr>, name: &str, init: Option<&Spanned<Expr>>) {
        let local = match (&ty.node, init) {
            (TypeExpr::Var, Some(init)) => LocalType::Inferred(init.clone()),
            (ty, _) => LocalType::Declared(ty.clone()),
        };
        self.scopes.insert(name, local);
    }
}

impl Visitor for LocalLookup {
    fn visit_block(&mut self, block: &Spanned<Block>) {
        self.scopes.push_scope();
        for stmt in &block.node.stmts {
            if self.found.is_some() {
                break;
            }
            self.visit_stmt(stmt);
        }
        self.scopes.pop_scope();
    }

    fn visit_stmt(&mut self, stmt: &Spanned<Stmt>) {
        if self.found.is_some() || !stmt.span.contains(self.target) && stmt.span.start > self.target.start {
            return;
        }
        match &stmt.node {
            Stmt::Local { ty, name, init } => {
                if let Some(init) = init {
                    self.visit_expr(init);
                }
                if self.found.is_none() {
                    self.declare(ty, &name.node, init.as_ref());
                }
            }
            Stmt::Block(block) => {
                self.scopes.push_scope();
                for s in &block.stmts {
                    if self.found.is_some() {
                        break;
                    }
                    self.visit_stmt(s);
                }
                self.scopes.pop_scope();
            }
            Stmt::For { .. } | Stmt::Foreach { .. } => {
                self.scopes.push_scope();
                if let Stmt::Foreach { ty, name, iterable, body } = &stmt.node {
                    self.visit_expr(iterable);
                    if self.found.is_none() {
                        let elem = match &ty.node {
                            TypeExpr::Var => LocalType::Declared(TypeExpr::Named("object".to_string())),
                            other => LocalType::Declared(other.clone()),
                        };
                        self.scopes.insert(&name.node, elem);
                        self.visit_stmt(body);
                    }
                } else {
                    walk_stmt(self, stmt);
                }
                self.scopes.pop_scope();
            }
            _ => walk_stmt(self, stmt),
        }
    }

    fn visit_expr(&mut self, expr: &Spanned<Expr>) {
        if self.found.is_some() {
            return;
        }
        if expr.span == self.target {
            if let Expr::Ident(name) = &expr.node {
                self.found = Some(self.scopes.lookup(name).cloned());
                return;
            }
        }
        if expr.span.contains(self.target) {
            walk_expr(self, expr);
        }
    }
}
