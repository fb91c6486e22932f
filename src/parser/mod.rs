pub mod ast;

use crate::diagnostics::SyntaxError;
use crate::lexer::token::Token;
use crate::span::{Span, Spanned};
use ast::*;

pub struct Parser<'a> {
    tokens: &'a [Spanned<Token>],
    source: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Spanned<Token>], source: &'a str) -> Self {
        Self { tokens, source, pos: 0 }
    }

    fn peek(&self) -> Option<&'a Spanned<Token>> {
        self.tokens.get(self.pos)
    }

    fn peek_token(&self, offset: usize) -> Option<&'a Token> {
        self.tokens.get(self.pos + offset).map(|t| &t.node)
    }

    fn at(&self, expected: &Token) -> bool {
        matches!(self.peek(), Some(tok) if std::mem::discriminant(&tok.node) == std::mem::discriminant(expected))
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.at(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn advance(&mut self) -> Option<&'a Spanned<Token>> {
        let tokens = self.tokens;
        if self.pos < tokens.len() {
            let tok = &tokens[self.pos];
            self.pos += 1;
            Some(tok)
        } else {
            None
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<Span, SyntaxError> {
        match self.tokens.get(self.pos) {
            Some(tok) if std::mem::discriminant(&tok.node) == std::mem::discriminant(expected) => {
                self.pos += 1;
                Ok(tok.span)
            }
            Some(tok) => Err(SyntaxError::new(
                format!("expected {expected}, found {}", tok.node),
                tok.span,
            )),
            None => Err(SyntaxError::new(
                format!("expected {expected}, found end of file"),
                self.eof_span(),
            )),
        }
    }

    fn expect_ident(&mut self) -> Result<Spanned<String>, SyntaxError> {
        match self.tokens.get(self.pos) {
            Some(tok) if matches!(tok.node, Token::Ident) => {
                let name = self.text(tok.span).to_string();
                self.pos += 1;
                Ok(Spanned::new(name, tok.span))
            }
            Some(tok) => Err(SyntaxError::new(
                format!("expected identifier, found {}", tok.node),
                tok.span,
            )),
            None => Err(SyntaxError::new(
                "expected identifier, found end of file",
                self.eof_span(),
            )),
        }
    }

    fn text(&self, span: Span) -> &'a str {
        &self.source[span.start..span.end]
    }

    fn eof_span(&self) -> Span {
        if let Some(last) = self.tokens.last() {
            Span::new(last.span.end, last.span.end)
        } else {
            Span::dummy()
        }
    }

    /// End offset of the most recently consumed token.
    fn prev_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.span.end)
            .unwrap_or(0)
    }

    fn start_offset(&self) -> usize {
        self.peek().map(|t| t.span.start).unwrap_or(self.source.len())
    }

    fn unexpected(&self, what: &str) -> SyntaxError {
        match self.peek() {
            Some(tok) => SyntaxError::new(format!("expected {what}, found {}", tok.node), tok.span),
            None => SyntaxError::new(format!("expected {what}, found end of file"), self.eof_span()),
        }
    }

    pub fn parse_unit(&mut self) -> Result<CompilationUnit, SyntaxError> {
        let mut usings = Vec::new();
        let mut types = Vec::new();

        while self.at(&Token::Using) {
            usings.push(self.parse_using()?);
        }
        while self.peek().is_some() {
            types.push(self.parse_type_decl()?);
        }

        Ok(CompilationUnit { usings, types, span: Span::new(0, self.source.len()) })
    }

    fn parse_using(&mut self) -> Result<Spanned<UsingDirective>, SyntaxError> {
        let start = self.expect(&Token::Using)?.start;
        let name = self.parse_qualified_name()?;
        let end = self.expect(&Token::Semi)?.end;
        Ok(Spanned::new(UsingDirective { name }, Span::new(start, end)))
    }

    fn parse_qualified_name(&mut self) -> Result<Spanned<String>, SyntaxError> {
        let first = self.expect_ident()?;
        let mut name = first.node;
        let mut span = first.span;
        while self.at(&Token::Dot) && matches!(self.peek_token(1), Some(Token::Ident)) {
            self.advance();
            let seg = self.expect_ident()?;
            name.push('.');
            name.push_str(&seg.node);
            span = span.cover(seg.span);
        }
        Ok(Spanned::new(name, span))
    }

    fn parse_modifiers(&mut self) -> Vec<String> {
        let mut modifiers = Vec::new();
        while let Some(tok) = self.peek() {
            if !matches!(tok.node, Token::Modifier) {
                break;
            }
            modifiers.push(self.text(tok.span).to_string());
            self.pos += 1;
        }
        modifiers
    }

    fn parse_type_decl(&mut self) -> Result<Spanned<TypeDecl>, SyntaxError> {
        let start = self.start_offset();
        let modifiers = self.parse_modifiers();
        let kind = match self.peek().map(|t| &t.node) {
            Some(Token::Class) => TypeDeclKind::Class,
            Some(Token::Struct) => TypeDeclKind::Struct,
            Some(Token::Interface) => TypeDeclKind::Interface,
            Some(Token::Enum) => TypeDeclKind::Enum,
            _ => return Err(self.unexpected("type declaration")),
        };
        self.advance();
        let name = self.expect_ident()?;

        let mut bases = Vec::new();
        if self.eat(&Token::Colon) {
            bases.push(self.parse_type()?);
            while self.eat(&Token::Comma) {
                bases.push(self.parse_type()?);
            }
        }

        self.expect(&Token::LBrace)?;
        let mut decl = TypeDecl {
            kind,
            modifiers,
            name,
            bases,
            fields: Vec::new(),
            methods: Vec::new(),
            variants: Vec::new(),
        };

        if kind == TypeDeclKind::Enum {
            while !self.at(&Token::RBrace) {
                decl.variants.push(self.expect_ident()?);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
        } else {
            while !self.at(&Token::RBrace) {
                if self.peek().is_none() {
                    return Err(self.unexpected("}"));
                }
                self.parse_member(&mut decl)?;
            }
        }
        let end = self.expect(&Token::RBrace)?.end;
        Ok(Spanned::new(decl, Span::new(start, end)))
    }

    fn parse_member(&mut self, decl: &mut TypeDecl) -> Result<(), SyntaxError> {
        let start = self.start_offset();
        let modifiers = self.parse_modifiers();

        // Constructor: `Name(`
        let is_ctor = matches!(self.peek_token(0), Some(Token::Ident))
            && matches!(self.peek_token(1), Some(Token::LParen));
        let return_type = if is_ctor { None } else { Some(self.parse_type()?) };
        let name = self.expect_ident()?;

        if self.at(&Token::LParen) {
            let params = self.parse_params()?;
            let body = if self.eat(&Token::Semi) { None } else { Some(self.parse_block()?) };
            let span = Span::new(start, self.prev_end());
            decl.methods.push(Spanned::new(
                MethodDecl { modifiers, return_type, name, params, body },
                span,
            ));
            return Ok(());
        }

        let Some(ty) = return_type else {
            return Err(self.unexpected("("));
        };
        let init = if self.eat(&Token::Eq) { Some(self.parse_expr(0)?) } else { None };
        let end = self.expect(&Token::Semi)?.end;
        decl.fields.push(Spanned::new(FieldDecl { modifiers, ty, name, init }, Span::new(start, end)));
        Ok(())
    }

    fn parse_params(&mut self) -> Result<Vec<Spanned<Param>>, SyntaxError> {
        self.expect(&Token::LParen)?;
        let mut params = Vec::new();
        while !self.at(&Token::RParen) {
            if !params.is_empty() {
                self.expect(&Token::Comma)?;
            }
            let ty = self.parse_type()?;
            let name = self.expect_ident()?;
            let span = ty.span.cover(name.span);
            params.push(Spanned::new(Param { ty, name }, span));
        }
        self.expect(&Token::RParen)?;
        Ok(params)
    }

    fn parse_type(&mut self) -> Result<Spanned<TypeExpr>, SyntaxError> {
        let (mut ty, mut span) = match self.peek() {
            Some(tok) if matches!(tok.node, Token::PredefinedType) => {
                let span = tok.span;
                self.pos += 1;
                (TypeExpr::Named(self.text(span).to_string()), span)
            }
            Some(tok) if matches!(tok.node, Token::Ident) => {
                let name = self.parse_qualified_name()?;
                (TypeExpr::Named(name.node), name.span)
            }
            _ => return Err(self.unexpected("type")),
        };

        loop {
            if self.at(&Token::Question) {
                let q = self.expect(&Token::Question)?;
                ty = TypeExpr::Nullable(Box::new(ty));
                span = span.cover(q);
            } else if self.at(&Token::LBracket) && matches!(self.peek_token(1), Some(Token::RBracket)) {
                self.advance();
                let close = self.expect(&Token::RBracket)?;
                ty = TypeExpr::Array(Box::new(ty));
                span = span.cover(close);
            } else {
                break;
            }
        }
        Ok(Spanned::new(ty, span))
    }

    /// Index just past a syntactically valid type starting at token `i`, if any.
    fn scan_type(&self, mut i: usize) -> Option<usize> {
        match self.tokens.get(i).map(|t| &t.node) {
            Some(Token::PredefinedType) => i += 1,
            Some(Token::Ident) => {
                i += 1;
                while matches!(self.tokens.get(i).map(|t| &t.node), Some(Token::Dot))
                    && matches!(self.tokens.get(i + 1).map(|t| &t.node), Some(Token::Ident))
                {
                    i += 2;
                }
            }
            _ => return None,
        }
        loop {
            match self.tokens.get(i).map(|t| &t.node) {
                Some(Token::Question) => i += 1,
                Some(Token::LBracket)
                    if matches!(self.tokens.get(i + 1).map(|t| &t.node), Some(Token::RBracket)) =>
                {
                    i += 2
                }
                _ => return Some(i),
            }
        }
    }

    fn is_local_decl_ahead(&self) -> bool {
        match self.scan_type(self.pos) {
            Some(j) => matches!(self.tokens.get(j).map(|t| &t.node), Some(Token::Ident)),
            None => false,
        }
    }

    fn parse_block(&mut self) -> Result<Spanned<Block>, SyntaxError> {
        let start = self.expect(&Token::LBrace)?.start;
        let mut stmts = Vec::new();
        while !self.at(&Token::RBrace) {
            if self.peek().is_none() {
                return Err(self.unexpected("}"));
            }
            stmts.push(self.parse_stmt()?);
        }
        let end = self.expect(&Token::RBrace)?.end;
        Ok(Spanned::new(Block { stmts }, Span::new(start, end)))
    }

    fn parse_stmt(&mut self) -> Result<Spanned<Stmt>, SyntaxError> {
        let Some(tok) = self.peek() else {
            return Err(self.unexpected("statement"));
        };
        let start = tok.span.start;
        match tok.node {
            Token::LBrace => {
                let block = self.parse_block()?;
                Ok(Spanned::new(Stmt::Block(block.node), block.span))
            }
            Token::Semi => {
                let span = self.expect(&Token::Semi)?;
                Ok(Spanned::new(Stmt::Empty, span))
            }
            Token::If => self.parse_if_stmt(),
            Token::While => {
                self.advance();
                self.expect(&Token::LParen)?;
                let condition = self.parse_expr(0)?;
                self.expect(&Token::RParen)?;
                let body = Box::new(self.parse_stmt()?);
                let span = Span::new(start, body.span.end);
                Ok(Spanned::new(Stmt::While { condition, body }, span))
            }
            Token::For => self.parse_for_stmt(),
            Token::Foreach => {
                self.advance();
                self.expect(&Token::LParen)?;
                let ty = self.parse_local_type()?;
                let name = self.expect_ident()?;
                self.expect(&Token::In)?;
                let iterable = self.parse_expr(0)?;
                self.expect(&Token::RParen)?;
                let body = Box::new(self.parse_stmt()?);
                let span = Span::new(start, body.span.end);
                Ok(Spanned::new(Stmt::Foreach { ty, name, iterable, body }, span))
            }
            Token::Return | Token::Throw => {
                let is_return = matches!(tok.node, Token::Return);
                self.advance();
                let value = if self.at(&Token::Semi) { None } else { Some(self.parse_expr(0)?) };
                let end = self.expect(&Token::Semi)?.end;
                let stmt = if is_return { Stmt::Return(value) } else { Stmt::Throw(value) };
                Ok(Spanned::new(stmt, Span::new(start, end)))
            }
            Token::Break | Token::Continue => {
                let stmt = if matches!(tok.node, Token::Break) { Stmt::Break } else { Stmt::Continue };
                self.advance();
                let end = self.expect(&Token::Semi)?.end;
                Ok(Spanned::new(stmt, Span::new(start, end)))
            }
            _ if self.is_local_decl_ahead() => {
                let local = self.parse_local_decl()?;
                let end = self.expect(&Token::Semi)?.end;
                Ok(Spanned::new(local.node, Span::new(start, end)))
            }
            _ => {
                let expr = self.parse_expr(0)?;
                let end = self.expect(&Token::Semi)?.end;
                Ok(Spanned::new(Stmt::Expr(expr), Span::new(start, end)))
            }
        }
    }

    fn parse_local_type(&mut self) -> Result<Spanned<TypeExpr>, SyntaxError> {
        let ty = self.parse_type()?;
        if ty.node == TypeExpr::Named("var".to_string()) {
            return Ok(Spanned::new(TypeExpr::Var, ty.span));
        }
        Ok(ty)
    }

    /// `Type name [= init]` without the terminating semicolon.
    fn parse_local_decl(&mut self) -> Result<Spanned<Stmt>, SyntaxError> {
        let ty = self.parse_local_type()?;
        let name = self.expect_ident()?;
        let init = if self.eat(&Token::Eq) { Some(self.parse_expr(0)?) } else { None };
        let end = init.as_ref().map(|e| e.span.end).unwrap_or(name.span.end);
        let span = Span::new(ty.span.start, end);
        Ok(Spanned::new(Stmt::Local { ty, name, init }, span))
    }

    fn parse_if_stmt(&mut self) -> Result<Spanned<Stmt>, SyntaxError> {
        let start = self.expect(&Token::If)?.start;
        self.expect(&Token::LParen)?;
        let condition = self.parse_expr(0)?;
        self.expect(&Token::RParen)?;
        let then_branch = Box::new(self.parse_stmt()?);
        let else_branch = if self.eat(&Token::Else) { Some(Box::new(self.parse_stmt()?)) } else { None };
        let end = else_branch.as_ref().map(|e| e.span.end).unwrap_or(then_branch.span.end);
        Ok(Spanned::new(
            Stmt::If { condition, then_branch, else_branch },
            Span::new(start, end),
        ))
    }

    fn parse_for_stmt(&mut self) -> Result<Spanned<Stmt>, SyntaxError> {
        let start = self.expect(&Token::For)?.start;
        self.expect(&Token::LParen)?;

        let init = if self.at(&Token::Semi) {
            None
        } else if self.is_local_decl_ahead() {
            Some(Box::new(self.parse_local_decl()?))
        } else {
            let expr = self.parse_expr(0)?;
            let span = expr.span;
            Some(Box::new(Spanned::new(Stmt::Expr(expr), span)))
        };
        self.expect(&Token::Semi)?;

        let condition = if self.at(&Token::Semi) { None } else { Some(self.parse_expr(0)?) };
        self.expect(&Token::Semi)?;

        let mut update = Vec::new();
        while !self.at(&Token::RParen) {
            if !update.is_empty() {
                self.expect(&Token::Comma)?;
            }
            update.push(self.parse_expr(0)?);
        }
        self.expect(&Token::RParen)?;

        let body = Box::new(self.parse_stmt()?);
        let span = Span::new(start, body.span.end);
        Ok(Spanned::new(Stmt::For { init, condition, update, body }, span))
    }

    pub fn parse_expr(&mut self, min_bp: u8) -> Result<Spanned<Expr>, SyntaxError> {
        let mut lhs = self.parse_unary()?;

        loop {
            let Some(tok) = self.peek() else { break };

            // Assignment is right-associative and only legal at the outermost level.
            let assign_op = match tok.node {
                Token::Eq => Some(AssignOp::Assign),
                Token::PlusEq => Some(AssignOp::AddAssign),
                Token::MinusEq => Some(AssignOp::SubAssign),
                _ => None,
            };
            if let Some(op) = assign_op {
                if min_bp > 0 {
                    break;
                }
                self.advance();
                let value = self.parse_expr(0)?;
                let span = lhs.span.cover(value.span);
                lhs = Spanned::new(
                    Expr::Assign { op, target: Box::new(lhs), value: Box::new(value) },
                    span,
                );
                continue;
            }

            // `is` / `as` bind at relational precedence and take a type operand.
            if matches!(tok.node, Token::Is | Token::As) {
                let (l_bp, _) = RELATIONAL_BP;
                if l_bp < min_bp {
                    break;
                }
                let keyword = tok.span;
                let is_test = matches!(tok.node, Token::Is);
                self.advance();
                let ty = self.parse_type()?;
                let span = lhs.span.cover(ty.span);
                lhs = if is_test {
                    Spanned::new(Expr::Is { expr: Box::new(lhs), keyword, ty }, span)
                } else {
                    Spanned::new(Expr::As { expr: Box::new(lhs), ty }, span)
                };
                continue;
            }

            let op = match tok.node {
                Token::PipePipe => BinOp::Or,
                Token::AmpAmp => BinOp::And,
                Token::EqEq => BinOp::Eq,
                Token::BangEq => BinOp::Neq,
                Token::Lt => BinOp::Lt,
                Token::Gt => BinOp::Gt,
                Token::LtEq => BinOp::LtEq,
                Token::GtEq => BinOp::GtEq,
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                Token::Percent => BinOp::Mod,
                _ => break,
            };

            let (l_bp, r_bp) = infix_binding_power(op);
            if l_bp < min_bp {
                break;
            }
            self.advance();
            let rhs = self.parse_expr(r_bp)?;
            let span = lhs.span.cover(rhs.span);
            lhs = Spanned::new(Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }, span);
        }

        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Spanned<Expr>, SyntaxError> {
        let Some(tok) = self.peek() else {
            return Err(self.unexpected("expression"));
        };
        let start = tok.span.start;
        let op = match tok.node {
            Token::Bang => Some(UnaryOp::Not),
            Token::Minus => Some(UnaryOp::Neg),
            Token::PlusPlus => Some(UnaryOp::PreIncrement),
            Token::MinusMinus => Some(UnaryOp::PreDecrement),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.parse_unary()?;
            let span = Span::new(start, operand.span.end);
            return Ok(Spanned::new(Expr::Unary { op, operand: Box::new(operand) }, span));
        }

        if self.is_cast_ahead() {
            self.expect(&Token::LParen)?;
            let ty = self.parse_type()?;
            self.expect(&Token::RParen)?;
            let operand = self.parse_unary()?;
            let span = Span::new(start, operand.span.end);
            return Ok(Spanned::new(Expr::Cast { ty, expr: Box::new(operand) }, span));
        }

        let primary = self.parse_primary()?;
        self.parse_postfix(primary)
    }

    /// `(T)x` versus `(x)`: a parenthesized type followed by a token that can
    /// start an operand is a cast.
    fn is_cast_ahead(&self) -> bool {
        if !self.at(&Token::LParen) {
            return false;
        }
        let Some(close) = self.scan_type(self.pos + 1) else { return false };
        if !matches!(self.tokens.get(close).map(|t| &t.node), Some(Token::RParen)) {
            return false;
        }
        let predefined = matches!(self.peek_token(1), Some(Token::PredefinedType));
        match self.tokens.get(close + 1).map(|t| &t.node) {
            Some(Token::Ident | Token::LParen | Token::IntLit(_) | Token::StringLit(_)
                | Token::This | Token::New | Token::Null | Token::True | Token::False
                | Token::Bang | Token::PredefinedType) => true,
            Some(Token::Minus | Token::PlusPlus | Token::MinusMinus) => predefined,
            _ => false,
        }
    }

    fn parse_primary(&mut self) -> Result<Spanned<Expr>, SyntaxError> {
        let Some(tok) = self.peek() else {
            return Err(self.unexpected("expression"));
        };
        let span = tok.span;
        let expr = match &tok.node {
            Token::Ident => Expr::Ident(self.text(span).to_string()),
            // `string.Empty`, `int.Parse(..)`
            Token::PredefinedType if matches!(self.peek_token(1), Some(Token::Dot)) => {
                Expr::Ident(self.text(span).to_string())
            }
            Token::IntLit(n) => Expr::IntLit(*n),
            Token::StringLit(s) => Expr::StringLit(s.clone()),
            Token::True => Expr::BoolLit(true),
            Token::False => Expr::BoolLit(false),
            Token::Null => Expr::Null,
            Token::This => Expr::This,
            Token::LParen => {
                self.advance();
                let inner = self.parse_expr(0)?;
                let end = self.expect(&Token::RParen)?.end;
                return Ok(Spanned::new(Expr::Paren(Box::new(inner)), Span::new(span.start, end)));
            }
            Token::New => {
                self.advance();
                let ty = self.parse_type()?;
                let (args, end) = self.parse_args()?;
                return Ok(Spanned::new(Expr::New { ty, args }, Span::new(span.start, end)));
            }
            _ => return Err(self.unexpected("expression")),
        };
        self.advance();
        Ok(Spanned::new(expr, span))
    }

    fn parse_postfix(&mut self, mut lhs: Spanned<Expr>) -> Result<Spanned<Expr>, SyntaxError> {
        loop {
            if self.eat(&Token::Dot) {
                let name = self.expect_ident()?;
                let span = lhs.span.cover(name.span);
                lhs = Spanned::new(Expr::Member { object: Box::new(lhs), name }, span);
            } else if self.at(&Token::LParen) {
                let (args, end) = self.parse_args()?;
                let span = Span::new(lhs.span.start, end);
                lhs = Spanned::new(Expr::Call { callee: Box::new(lhs), args }, span);
            } else if self.at(&Token::PlusPlus) || self.at(&Token::MinusMinus) {
                let op = if self.at(&Token::PlusPlus) { PostfixOp::Increment } else { PostfixOp::Decrement };
                let end = self.advance().map(|t| t.span.end).unwrap_or(lhs.span.end);
                let span = Span::new(lhs.span.start, end);
                lhs = Spanned::new(Expr::Postfix { op, operand: Box::new(lhs) }, span);
            } else {
                return Ok(lhs);
            }
        }
    }

    fn parse_args(&mut self) -> Result<(Vec<Spanned<Expr>>, usize), SyntaxError> {
        self.expect(&Token::LParen)?;
        let mut args = Vec::new();
        while !self.at(&Token::RParen) {
            if !args.is_empty() {
                self.expect(&Token::Comma)?;
            }
            args.push(self.parse_expr(0)?);
        }
        let end = self.expect(&Token::RParen)?.end;
        Ok((args, end))
    }
}

const RELATIONAL_BP: (u8, u8) = (7, 8);

fn infix_binding_power(op: BinOp) -> (u8, u8) {
    match op {
        BinOp::Or => (1, 2),
        BinOp::And => (3, 4),
        BinOp::Eq | BinOp::Neq => (5, 6),
        BinOp::Lt | BinOp::Gt | BinOp::LtEq | BinOp::GtEq => RELATIONAL_BP,
        BinOp::Add | BinOp::Sub => (9, 10),
        BinOp::Mul | BinOp::Div | BinOp::Mod => (11, 12),
    }
}

/// Lex and parse a whole compilation unit.
pub fn parse_unit(source: &str) -> Result<CompilationUnit, SyntaxError> {
    let tokens = crate::lexer::lex(source)?;
    let mut parser = Parser::new(&tokens, source);
    parser.parse_unit()
}
