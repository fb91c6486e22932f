pub mod token;
pub use token::is_keyword;

use logos::Logos;
use crate::span::{Span, Spanned};
use crate::diagnostics::SyntaxError;
use token::Token;

pub fn lex(source: &str) -> Result<Vec<Spanned<Token>>, SyntaxError> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(tok) => tokens.push(Spanned::new(tok, Span::new(span.start, span.end))),
            Err(()) => {
                let text = &source[span.start..span.end];
                let msg = if text.starts_with("/*") {
                    "unterminated block comment".to_string()
                } else {
                    format!("unexpected character '{text}'")
                };
                return Err(SyntaxError::new(msg, Span::new(span.start, span.end)));
            }
        }
    }

    Ok(tokens)
}
