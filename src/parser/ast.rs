use crate::span::{Span, Spanned};

#[derive(Debug, Clone, PartialEq)]
pub struct CompilationUnit {
    pub usings: Vec<Spanned<UsingDirective>>,
    pub types: Vec<Spanned<TypeDecl>>,
    pub span: Span,
}

impl CompilationUnit {
    pub fn has_using(&self, namespace: &str) -> bool {
        self.usings.iter().any(|u| u.node.name.node == namespace)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UsingDirective {
    /// Dotted namespace name, e.g. `System.Diagnostics.Contracts`.
    pub name: Spanned<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeDeclKind {
    Class,
    Struct,
    Interface,
    Enum,
}

impl TypeDeclKind {
    pub fn keyword(self) -> &'static str {
        match self {
            TypeDeclKind::Class => "class",
            TypeDeclKind::Struct => "struct",
            TypeDeclKind::Interface => "interface",
            TypeDeclKind::Enum => "enum",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    pub kind: TypeDeclKind,
    pub modifiers: Vec<String>,
    pub name: Spanned<String>,
    pub bases: Vec<Spanned<TypeExpr>>,
    pub fields: Vec<Spanned<FieldDecl>>,
    pub methods: Vec<Spanned<MethodDecl>>,
    /// Enum member names (empty for other kinds).
    pub variants: Vec<Spanned<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub modifiers: Vec<String>,
    pub ty: Spanned<TypeExpr>,
    pub name: Spanned<String>,
    pub init: Option<Spanned<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub modifiers: Vec<String>,
    /// `None` for constructors.
    pub return_type: Option<Spanned<TypeExpr>>,
    pub name: Spanned<String>,
    pub params: Vec<Spanned<Param>>,
    /// `None` for abstract, extern and interface members.
    pub body: Option<Spanned<Block>>,
}

impl MethodDecl {
    pub fn is_constructor(&self) -> bool {
        self.return_type.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub ty: Spanned<TypeExpr>,
    pub name: Spanned<String>,
}

/// Type syntax. Carries no spans of its own so structural equality is span-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    /// Implicitly typed local (`var`).
    Var,
    /// Simple, predefined or dotted name: `Bar`, `int`, `System.IO.Stream`.
    Named(String),
    Nullable(Box<TypeExpr>),
    Array(Box<TypeExpr>),
}

impl TypeExpr {
    /// Rightmost identifier of the type name, without `@` escaping.
    pub fn simple_name(&self) -> Option<&str> {
        match self {
            TypeExpr::Named(name) => {
                let last = name.rsplit('.').next().unwrap_or(name);
                Some(ident_value(last))
            }
            TypeExpr::Nullable(inner) | TypeExpr::Array(inner) => inner.simple_name(),
            TypeExpr::Var => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Spanned<Stmt>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Local {
        ty: Spanned<TypeExpr>,
        name: Spanned<String>,
        init: Option<Spanned<Expr>>,
    },
    Expr(Spanned<Expr>),
    Return(Option<Spanned<Expr>>),
    Throw(Option<Spanned<Expr>>),
    Break,
    Continue,
    Empty,
    Block(Block),
    If {
        condition: Spanned<Expr>,
        then_branch: Box<Spanned<Stmt>>,
        else_branch: Option<Box<Spanned<Stmt>>>,
    },
    While {
        condition: Spanned<Expr>,
        body: Box<Spanned<Stmt>>,
    },
    For {
        init: Option<Box<Spanned<Stmt>>>,
        condition: Option<Spanned<Expr>>,
        update: Vec<Spanned<Expr>>,
        body: Box<Spanned<Stmt>>,
    },
    Foreach {
        ty: Spanned<TypeExpr>,
        name: Spanned<String>,
        iterable: Spanned<Expr>,
        body: Box<Spanned<Stmt>>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Identifier as written, including a leading `@` when escaped.
    Ident(String),
    IntLit(i64),
    StringLit(String),
    BoolLit(bool),
    Null,
    This,
    Paren(Box<Spanned<Expr>>),
    Unary {
        op: UnaryOp,
        operand: Box<Spanned<Expr>>,
    },
    Postfix {
        op: PostfixOp,
        operand: Box<Spanned<Expr>>,
    },
    Binary {
        op: BinOp,
        lhs: Box<Spanned<Expr>>,
        rhs: Box<Spanned<Expr>>,
    },
    Assign {
        op: AssignOp,
        target: Box<Spanned<Expr>>,
        value: Box<Spanned<Expr>>,
    },
    Is {
        expr: Box<Spanned<Expr>>,
        /// Span of the `is` keyword token.
        keyword: Span,
        ty: Spanned<TypeExpr>,
    },
    As {
        expr: Box<Spanned<Expr>>,
        ty: Spanned<TypeExpr>,
    },
    Cast {
        ty: Spanned<TypeExpr>,
        expr: Box<Spanned<Expr>>,
    },
    Member {
        object: Box<Spanned<Expr>>,
        name: Spanned<String>,
    },
    Call {
        callee: Box<Spanned<Expr>>,
        args: Vec<Spanned<Expr>>,
    },
    New {
        ty: Spanned<TypeExpr>,
        args: Vec<Spanned<Expr>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    PreIncrement,
    PreDecrement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostfixOp {
    Increment,
    Decrement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Or,
    And,
    Eq,
    Neq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
}

/// Identifier text without the verbatim `@` prefix.
pub fn ident_value(name: &str) -> &str {
    name.strip_prefix('@').unwrap_or(name)
}

/// Peel any number of wrapping parentheses.
pub fn strip_parens(expr: &Spanned<Expr>) -> &Spanned<Expr> {
    let mut current = expr;
    while let Expr::Paren(inner) = &current.node {
        current = inner;
    }
    current
}
