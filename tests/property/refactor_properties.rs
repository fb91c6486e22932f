use proptest::prelude::*;
use refactorkit::parser::parse_unit;
use refactorkit::refactor::use_as_null_check;
use refactorkit::{refactorings_at, CancellationToken, Document, EngineConfig, Span};

/// Statements that read the converted value without touching `foo`.
fn arb_reader() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Use((Bar)foo);"),
        Just("Use(foo as Bar);"),
        Just("Use(((Bar)(foo)).x);"),
        Just("Other(foo);"),
        Just("Use(1);"),
    ]
    .prop_map(String::from)
}

fn source_with(stmts: &[String]) -> String {
    format!("class Bar {{ bool x; void M(object foo) {{ if (foo is Bar) {{ {} }} }} }}", stmts.join(" "))
}

/// Every cast of `foo` inside the guarded block is replaced.
#[test]
fn prop_guarded_casts_are_all_rewritten() {
    proptest!(|(stmts in prop::collection::vec(arb_reader(), 0..8))| {
        let source = source_with(&stmts);
        let doc = Document::parse("P.cs", &source).unwrap();
        let at = source.find(" is ").unwrap() + 1;
        let actions = refactorings_at(&doc, Span::new(at, at), &EngineConfig::default(), &CancellationToken::new()).unwrap();
        prop_assert_eq!(actions.len(), 1);
        prop_assert_eq!(actions[0].provider(), use_as_null_check::ID);

        let first = actions[0].apply(&doc).unwrap();
        let second = actions[0].apply(&doc).unwrap();
        prop_assert_eq!(&first, &second);

        let text = first.text();
        prop_assert!(text.contains("var bar = foo as Bar;"), "{}", text);
        prop_assert!(!text.contains("(Bar)foo"), "{}", text);
        prop_assert!(!text.contains("foo as Bar)"), "{}", text);
        prop_assert!(parse_unit(&text).is_ok());
    });
}

/// Probing any offset either offers actions or nothing, never panics, and
/// every offered action applies to the document it came from.
#[test]
fn prop_any_cursor_is_safe() {
    let source = "using System;\nclass Bar { void M(object foo, string s) { if (!(foo is Bar) || ((Bar)foo).y) return; Use((Bar)foo); } }";
    let doc = Document::parse("P.cs", source).unwrap();
    proptest!(|(at in 0..source.len() + 4)| {
        let actions = refactorings_at(&doc, Span::new(at, at), &EngineConfig::default(), &CancellationToken::new()).unwrap();
        for action in &actions {
            prop_assert!(action.apply(&doc).is_ok());
        }
    });
}

#[test]
fn prop_cancelled_runs_return_nothing() {
    let source = source_with(&["Use((Bar)foo);".to_string()]);
    let doc = Document::parse("P.cs", &source).unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();
    proptest!(|(at in 0..source.len())| {
        prop_assert!(refactorings_at(&doc, Span::new(at, at), &EngineConfig::default(), &cancel).is_err());
    });
}
