use proptest::prelude::*;
use refactorkit::lexer::{is_keyword, lex, token::Token};

/// Lexing arbitrary text returns tokens or an error, never a panic.
#[test]
fn prop_lexer_never_panics() {
    proptest!(|(source in "\\PC{0,500}")| {
        let _ = lex(&source);
    });
}

#[test]
fn prop_lexing_is_deterministic() {
    proptest!(|(source in "\\PC{0,300}")| {
        let first = lex(&source);
        let second = lex(&source);
        prop_assert_eq!(first, second);
    });
}

/// Token spans are in bounds, non-overlapping and increasing.
#[test]
fn prop_spans_are_ordered() {
    proptest!(|(source in "[a-z0-9 (){};=!.<>+@]{0,200}")| {
        if let Ok(tokens) = lex(&source) {
            let mut last_end = 0;
            for token in &tokens {
                prop_assert!(token.span.start >= last_end);
                prop_assert!(token.span.start <= token.span.end);
                prop_assert!(token.span.end <= source.len());
                last_end = token.span.end;
            }
        }
    });
}

/// Any identifier that is not a keyword lexes as one identifier, with or
/// without the verbatim prefix.
#[test]
fn prop_identifiers_lex_whole() {
    proptest!(|(name in "[a-zA-Z_][a-zA-Z0-9_]{0,12}", verbatim in any::<bool>())| {
        prop_assume!(!is_keyword(&name));
        let text = if verbatim { format!("@{name}") } else { name.clone() };
        let tokens = lex(&text).unwrap();
        prop_assert_eq!(tokens.len(), 1);
        prop_assert!(tokens[0].node == Token::Ident);
        prop_assert_eq!(tokens[0].span.len(), text.len());
    });
}
