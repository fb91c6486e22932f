use logos::{FilterResult, Lexer, Logos};

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
pub enum Token {
    // Declarations
    #[token("using")]
    Using,
    #[token("class")]
    Class,
    #[token("struct")]
    Struct,
    #[token("interface")]
    Interface,
    #[token("enum")]
    Enum,

    #[token("public")]
    #[token("private")]
    #[token("protected")]
    #[token("internal")]
    #[token("static")]
    #[token("abstract")]
    #[token("virtual")]
    #[token("override")]
    #[token("sealed")]
    #[token("readonly")]
    #[token("extern")]
    #[token("const")]
    Modifier,

    #[token("bool")]
    #[token("byte")]
    #[token("char")]
    #[token("decimal")]
    #[token("double")]
    #[token("float")]
    #[token("int")]
    #[token("long")]
    #[token("object")]
    #[token("sbyte")]
    #[token("short")]
    #[token("string")]
    #[token("uint")]
    #[token("ulong")]
    #[token("ushort")]
    #[token("void")]
    PredefinedType,

    // Statements
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("for")]
    For,
    #[token("foreach")]
    Foreach,
    #[token("in")]
    In,
    #[token("return")]
    Return,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("throw")]
    Throw,

    // Expressions
    #[token("new")]
    New,
    #[token("this")]
    This,
    #[token("null")]
    Null,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("is")]
    Is,
    #[token("as")]
    As,

    // Literals
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    IntLit(i64),

    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| {
        let s = lex.slice();
        let raw = &s[1..s.len()-1];
        let mut result = String::with_capacity(raw.len());
        let mut chars = raw.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                match chars.next() {
                    Some('n') => result.push('\n'),
                    Some('r') => result.push('\r'),
                    Some('t') => result.push('\t'),
                    Some('\\') => result.push('\\'),
                    Some('"') => result.push('"'),
                    Some(other) => { result.push('\\'); result.push(other); }
                    None => result.push('\\'),
                }
            } else {
                result.push(c);
            }
        }
        Some(result)
    })]
    StringLit(String),

    // Never emitted: the callback skips the comment or fails when it is unterminated.
    #[token("/*", block_comment)]
    BlockComment,

    // Identifiers, optionally verbatim (`@class`)
    #[regex(r"@?[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    // Operators
    #[token("++")]
    PlusPlus,
    #[token("+")]
    Plus,
    #[token("--")]
    MinusMinus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("=")]
    Eq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("!")]
    Bang,

    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token("?")]
    Question,
}

fn block_comment(lex: &mut Lexer<'_, Token>) -> FilterResult<(), ()> {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            FilterResult::Skip
        }
        None => {
            lex.bump(lex.remainder().len());
            FilterResult::Error(())
        }
    }
}

/// Returns true if the given string is a reserved C# keyword and therefore
/// needs `@` escaping to be used as an identifier.
pub fn is_keyword(s: &str) -> bool {
    matches!(s, "abstract" | "as" | "base" | "bool" | "break" | "byte" | "case" | "catch"
        | "char" | "checked" | "class" | "const" | "continue" | "decimal" | "default"
        | "delegate" | "do" | "double" | "else" | "enum" | "event" | "explicit" | "extern"
        | "false" | "finally" | "fixed" | "float" | "for" | "foreach" | "goto" | "if"
        | "implicit" | "in" | "int" | "interface" | "internal" | "is" | "lock" | "long"
        | "namespace" | "new" | "null" | "object" | "operator" | "out" | "override"
        | "params" | "private" | "protected" | "public" | "readonly" | "ref" | "return"
        | "sbyte" | "sealed" | "short" | "sizeof" | "stackalloc" | "static" | "string"
        | "struct" | "switch" | "this" | "throw" | "true" | "try" | "typeof" | "uint"
        | "ulong" | "unchecked" | "unsafe" | "ushort" | "using" | "virtual" | "void"
        | "volatile" | "while")
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Using => write!(f, "using"),
            Token::Class => write!(f, "class"),
            Token::Struct => write!(f, "struct"),
            Token::Interface => write!(f, "interface"),
            Token::Enum => write!(f, "enum"),
            Token::Modifier => write!(f, "modifier"),
            Token::PredefinedType => write!(f, "predefined type"),
            Token::If => write!(f, "if"),
            Token::Else => write!(f, "else"),
            Token::While => write!(f, "while"),
            Token::For => write!(f, "for"),
            Token::Foreach => write!(f, "foreach"),
            Token::In => write!(f, "in"),
            Token::Return => write!(f, "return"),
            Token::Break => write!(f, "break"),
            Token::Continue => write!(f, "continue"),
            Token::Throw => write!(f, "throw"),
            Token::New => write!(f, "new"),
            Token::This => write!(f, "this"),
            Token::Null => write!(f, "null"),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::Is => write!(f, "is"),
            Token::As => write!(f, "as"),
            Token::IntLit(n) => write!(f, "{n}"),
            Token::StringLit(s) => write!(f, "\"{s}\""),
            Token::BlockComment => write!(f, "comment"),
            Token::Ident => write!(f, "identifier"),
            Token::PlusPlus => write!(f, "++"),
            Token::Plus => write!(f, "+"),
            Token::MinusMinus => write!(f, "--"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Percent => write!(f, "%"),
            Token::PlusEq => write!(f, "+="),
            Token::MinusEq => write!(f, "-="),
            Token::Eq => write!(f, "="),
            Token::EqEq => write!(f, "=="),
            Token::BangEq => write!(f, "!="),
            Token::Lt => write!(f, "<"),
            Token::Gt => write!(f, ">"),
            Token::LtEq => write!(f, "<="),
            Token::GtEq => write!(f, ">="),
            Token::AmpAmp => write!(f, "&&"),
            Token::PipePipe => write!(f, "||"),
            Token::Bang => write!(f, "!"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::Comma => write!(f, ","),
            Token::Semi => write!(f, ";"),
            Token::Colon => write!(f, ":"),
            Token::Dot => write!(f, "."),
            Token::Question => write!(f, "?"),
        }
    }
}
