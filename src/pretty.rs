use crate::parser::ast::*;

/// Pretty-print a `CompilationUnit` back into canonical source text.
///
/// Layout is fixed (four-space indent, braces on the opening line), so two
/// trees that differ only in spans or annotations print identically.
pub fn pretty_print(unit: &CompilationUnit) -> String {
    let mut pp = PrettyPrinter::new();
    pp.emit_unit(unit);
    pp.buf
}

/// Print a single expression, adding parentheses only where precedence demands.
pub fn print_expr(expr: &Expr) -> String {
    let mut pp = PrettyPrinter::new();
    pp.emit_expr(expr, 0);
    pp.buf
}

/// Print a single statement at indent level zero.
pub fn print_stmt(stmt: &Stmt) -> String {
    let mut pp = PrettyPrinter::new();
    pp.emit_stmt(stmt);
    pp.buf
}

pub fn print_type(ty: &TypeExpr) -> String {
    let mut pp = PrettyPrinter::new();
    pp.emit_type_expr(ty);
    pp.buf
}

struct PrettyPrinter {
    buf: String,
    indent: usize,
}

impl PrettyPrinter {
    fn new() -> Self {
        Self {
            buf: String::new(),
            indent: 0,
        }
    }

    fn write(&mut self, s: &str) {
        self.buf.push_str(s);
    }

    fn newline(&mut self) {
        self.buf.push('\n');
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.buf.push_str("    ");
        }
    }

    fn indent(&mut self) {
        self.indent += 1;
    }

    fn dedent(&mut self) {
        self.indent -= 1;
    }

    // ── Compilation unit ─────────────────────────────────────────────

    fn emit_unit(&mut self, unit: &CompilationUnit) {
        for using in &unit.usings {
            self.write("using ");
            self.write(&using.node.name.node);
            self.write(";");
            self.newline();
        }
        for (i, decl) in unit.types.iter().enumerate() {
            if i > 0 || !unit.usings.is_empty() {
                self.newline();
            }
            self.emit_type_decl(&decl.node);
            self.newline();
        }
    }

    fn emit_modifiers(&mut self, modifiers: &[String]) {
        for m in modifiers {
            self.write(m);
            self.write(" ");
        }
    }

    fn emit_type_decl(&mut self, decl: &TypeDecl) {
        self.emit_modifiers(&decl.modifiers);
        self.write(decl.kind.keyword());
        self.write(" ");
        self.write(&decl.name.node);
        if !decl.bases.is_empty() {
            self.write(" : ");
            for (i, base) in decl.bases.iter().enumerate() {
                if i > 0 {
                    self.write(", ");
                }
                self.emit_type_expr(&base.node);
            }
        }
        self.write(" {");
        self.newline();
        self.indent();

        for variant in &decl.variants {
            self.write_indent();
            self.write(&variant.node);
            self.write(",");
            self.newline();
        }

        for field in &decl.fields {
            self.write_indent();
            self.emit_field(&field.node);
            self.newline();
        }

        for (i, method) in decl.methods.iter().enumerate() {
            if i > 0 || !decl.fields.is_empty() {
                self.newline();
            }
            self.write_indent();
            self.emit_method(&method.node);
            self.newline();
        }

        self.dedent();
        self.write_indent();
        self.write("}");
    }

    fn emit_field(&mut self, field: &FieldDecl) {
        self.emit_modifiers(&field.modifiers);
        self.emit_type_expr(&field.ty.node);
        self.write(" ");
        self.write(&field.name.node);
        if let Some(init) = &field.init {
            self.write(" = ");
            self.emit_expr(&init.node, 0);
        }
        self.write(";");
    }

    fn emit_method(&mut self, method: &MethodDecl) {
        self.emit_modifiers(&method.modifiers);
        if let Some(ret) = &method.return_type {
            self.emit_type_expr(&ret.node);
            self.write(" ");
        }
        self.write(&method.name.node);
        self.write("(");
        for (i, p) in method.params.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.emit_type_expr(&p.node.ty.node);
            self.write(" ");
            self.write(&p.node.name.node);
        }
        self.write(")");
        match &method.body {
            Some(body) => {
                self.write(" ");
                self.emit_block(&body.node);
            }
            None => self.write(";"),
        }
    }

    fn emit_type_expr(&mut self, ty: &TypeExpr) {
        match ty {
            TypeExpr::Var => self.write("var"),
            TypeExpr::Named(name) => self.write(name),
            TypeExpr::Nullable(inner) => {
                self.emit_type_expr(inner);
                self.write("?");
            }
            TypeExpr::Array(inner) => {
                self.emit_type_expr(inner);
                self.write("[]");
            }
        }
    }

    // ── Block ────────────────────────────────────────────────────────

    fn emit_block(&mut self, block: &Block) {
        self.write("{");
        self.newline();
        self.indent();
        for stmt in &block.stmts {
            self.write_indent();
            self.emit_stmt(&stmt.node);
            self.newline();
        }
        self.dedent();
        self.write_indent();
        self.write("}");
    }

    /// Body of `if`/`while`/`for`/`foreach`: blocks stay on the header line,
    /// single statements go on their own indented line.
    fn emit_embedded(&mut self, stmt: &Stmt) {
        if let Stmt::Block(block) = stmt {
            self.write(" ");
            self.emit_block(block);
        } else {
            self.newline();
            self.indent();
            self.write_indent();
            self.emit_stmt(stmt);
            self.dedent();
        }
    }

    // ── Statements ───────────────────────────────────────────────────

    fn emit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Local { .. } | Stmt::Expr(_) => {
                self.emit_simple_stmt(stmt);
                self.write(";");
            }
            Stmt::Return(value) | Stmt::Throw(value) => {
                self.write(if matches!(stmt, Stmt::Return(_)) { "return" } else { "throw" });
                if let Some(e) = value {
                    self.write(" ");
                    self.emit_expr(&e.node, 0);
                }
                self.write(";");
            }
            Stmt::Break => self.write("break;"),
            Stmt::Continue => self.write("continue;"),
            Stmt::Empty => self.write(";"),
            Stmt::Block(block) => self.emit_block(block),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.write("if (");
                self.emit_expr(&condition.node, 0);
                self.write(")");
                self.emit_embedded(&then_branch.node);
                if let Some(else_branch) = else_branch {
                    if matches!(then_branch.node, Stmt::Block(_)) {
                        self.write(" else");
                    } else {
                        self.newline();
                        self.write_indent();
                        self.write("else");
                    }
                    // else-if chains stay flat
                    if let Stmt::If { .. } = &else_branch.node {
                        self.write(" ");
                        self.emit_stmt(&else_branch.node);
                    } else {
                        self.emit_embedded(&else_branch.node);
                    }
                }
            }
            Stmt::While { condition, body } => {
                self.write("while (");
                self.emit_expr(&condition.node, 0);
                self.write(")");
                self.emit_embedded(&body.node);
            }
            Stmt::For {
                init,
                condition,
                update,
                body,
            } => {
                self.write("for (");
                if let Some(init) = init {
                    self.emit_simple_stmt(&init.node);
                }
                self.write(";");
                if let Some(cond) = condition {
                    self.write(" ");
                    self.emit_expr(&cond.node, 0);
                }
                self.write(";");
                for (i, u) in update.iter().enumerate() {
                    self.write(if i == 0 { " " } else { ", " });
                    self.emit_expr(&u.node, 0);
                }
                self.write(")");
                self.emit_embedded(&body.node);
            }
            Stmt::Foreach {
                ty,
                name,
                iterable,
                body,
            } => {
                self.write("foreach (");
                self.emit_type_expr(&ty.node);
                self.write(" ");
                self.write(&name.node);
                self.write(" in ");
                self.emit_expr(&iterable.node, 0);
                self.write(")");
                self.emit_embedded(&body.node);
            }
        }
    }

    /// Local declaration or expression without the terminating `;`.
    fn emit_simple_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Local { ty, name, init } => {
                self.emit_type_expr(&ty.node);
                self.write(" ");
                self.write(&name.node);
                if let Some(init) = init {
                    self.write(" = ");
                    self.emit_expr(&init.node, 0);
                }
            }
            Stmt::Expr(expr) => self.emit_expr(&expr.node, 0),
            other => self.emit_stmt(other),
        }
    }

    // ── Expressions ──────────────────────────────────────────────────

    fn emit_expr(&mut self, expr: &Expr, parent_prec: u8) {
        match expr {
            Expr::Ident(name) => self.write(name),
            Expr::IntLit(n) => self.write(&n.to_string()),
            Expr::StringLit(s) => {
                self.write("\"");
                self.write(&escape_string(s));
                self.write("\"");
            }
            Expr::BoolLit(b) => self.write(if *b { "true" } else { "false" }),
            Expr::Null => self.write("null"),
            Expr::This => self.write("this"),
            Expr::Paren(inner) => {
                self.write("(");
                self.emit_expr(&inner.node, 0);
                self.write(")");
            }
            Expr::Unary { op, operand } => {
                let need_parens = UNARY_PREC < parent_prec;
                if need_parens {
                    self.write("(");
                }
                self.write(match op {
                    UnaryOp::Not => "!",
                    UnaryOp::Neg => "-",
                    UnaryOp::PreIncrement => "++",
                    UnaryOp::PreDecrement => "--",
                });
                self.emit_expr(&operand.node, UNARY_PREC);
                if need_parens {
                    self.write(")");
                }
            }
            Expr::Postfix { op, operand } => {
                self.emit_expr(&operand.node, POSTFIX_PREC);
                self.write(match op {
                    PostfixOp::Increment => "++",
                    PostfixOp::Decrement => "--",
                });
            }
            Expr::Binary { op, lhs, rhs } => {
                let prec = binop_prec(*op);
                let need_parens = prec < parent_prec;
                if need_parens {
                    self.write("(");
                }
                // Left child: same precedence (left-associative, no parens needed)
                self.emit_expr(&lhs.node, prec);
                self.write(" ");
                self.write(binop_str(*op));
                self.write(" ");
                // Right child: prec + 1 (forces parens for same-prec on right)
                self.emit_expr(&rhs.node, prec + 1);
                if need_parens {
                    self.write(")");
                }
            }
            Expr::Assign { op, target, value } => {
                let need_parens = 0 < parent_prec;
                if need_parens {
                    self.write("(");
                }
                self.emit_expr(&target.node, 1);
                self.write(match op {
                    AssignOp::Assign => " = ",
                    AssignOp::AddAssign => " += ",
                    AssignOp::SubAssign => " -= ",
                });
                self.emit_expr(&value.node, 0);
                if need_parens {
                    self.write(")");
                }
            }
            Expr::Is { expr: operand, ty, .. } | Expr::As { expr: operand, ty } => {
                let keyword = if matches!(expr, Expr::Is { .. }) { " is " } else { " as " };
                let need_parens = RELATIONAL_PREC < parent_prec;
                if need_parens {
                    self.write("(");
                }
                self.emit_expr(&operand.node, RELATIONAL_PREC);
                self.write(keyword);
                self.emit_type_expr(&ty.node);
                if need_parens {
                    self.write(")");
                }
            }
            Expr::Cast { ty, expr } => {
                let need_parens = UNARY_PREC < parent_prec;
                if need_parens {
                    self.write("(");
                }
                self.write("(");
                self.emit_type_expr(&ty.node);
                self.write(")");
                self.emit_expr(&expr.node, UNARY_PREC);
                if need_parens {
                    self.write(")");
                }
            }
            Expr::Member { object, name } => {
                self.emit_expr(&object.node, POSTFIX_PREC);
                self.write(".");
                self.write(&name.node);
            }
            Expr::Call { callee, args } => {
                self.emit_expr(&callee.node, POSTFIX_PREC);
                self.emit_args(args);
            }
            Expr::New { ty, args } => {
                self.write("new ");
                self.emit_type_expr(&ty.node);
                self.emit_args(args);
            }
        }
    }

    fn emit_args(&mut self, args: &[crate::span::Spanned<Expr>]) {
        self.write("(");
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.emit_expr(&arg.node, 0);
        }
        self.write(")");
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

const RELATIONAL_PREC: u8 = 7;
const UNARY_PREC: u8 = 13;
const POSTFIX_PREC: u8 = 15;

fn binop_prec(op: BinOp) -> u8 {
    match op {
        BinOp::Or => 1,
        BinOp::And => 3,
        BinOp::Eq | BinOp::Neq => 5,
        BinOp::Lt | BinOp::Gt | BinOp::LtEq | BinOp::GtEq => RELATIONAL_PREC,
        BinOp::Add | BinOp::Sub => 9,
        BinOp::Mul | BinOp::Div | BinOp::Mod => 11,
    }
}

fn binop_str(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Mod => "%",
        BinOp::Eq => "==",
        BinOp::Neq => "!=",
        BinOp::Lt => "<",
        BinOp::Gt => ">",
        BinOp::LtEq => "<=",
        BinOp::GtEq => ">=",
        BinOp::And => "&&",
        BinOp::Or => "||",
    }
}

fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            c => out.push(c),
        }
    }
    out
}
