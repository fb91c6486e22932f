#![allow(dead_code)]

use refactorkit::parser::parse_unit;
use refactorkit::pretty::pretty_print;
use refactorkit::refactor::{CodeAction, Outcome, ProviderRegistry, RefactoringContext};
use refactorkit::{CancellationToken, Document, EngineConfig, SourceModel, Span};

/// Remove the `$` cursor marker and return the clean source with the cursor span.
pub fn split_cursor(marked: &str) -> (String, Span) {
    let at = marked.find('$').expect("source has no $ cursor marker");
    let mut source = String::with_capacity(marked.len() - 1);
    source.push_str(&marked[..at]);
    source.push_str(&marked[at + 1..]);
    (source, Span::new(at, at))
}

/// Canonical text of a source file, so comparisons ignore layout.
pub fn canonical(source: &str) -> String {
    pretty_print(&parse_unit(source).expect("expected source should parse"))
}

/// Run one provider at the marked cursor.
pub fn run_provider(provider: &str, marked: &str) -> (Document, Outcome) {
    run_provider_with(provider, marked, &EngineConfig::default())
}

pub fn run_provider_with(provider: &str, marked: &str, config: &EngineConfig) -> (Document, Outcome) {
    let (source, cursor) = split_cursor(marked);
    let doc = Document::parse("Test.cs", &source).expect("input should parse");
    let model = SourceModel::new(&doc.root);
    let cancel = CancellationToken::new();
    let ctx = RefactoringContext::new(&doc, &model, cursor, &cancel, config);
    let outcome = ProviderRegistry::with_defaults().run(provider, &ctx).expect("not cancelled");
    (doc, outcome)
}

/// The single action a provider offers at the marker.
pub fn single_action(provider: &str, marked: &str) -> (Document, CodeAction) {
    let (doc, outcome) = run_provider(provider, marked);
    let mut actions = outcome.into_actions();
    assert_eq!(actions.len(), 1, "expected exactly one action from {provider}");
    (doc, actions.remove(0))
}

/// Apply the provider's action and return the canonical result text.
pub fn refactor(provider: &str, marked: &str) -> String {
    let (doc, action) = single_action(provider, marked);
    action.apply(&doc).expect("action applies").text()
}

pub fn assert_refactors(provider: &str, marked: &str, expected: &str) {
    let actual = refactor(provider, marked);
    let expected = canonical(expected);
    assert_eq!(actual, expected, "\n--- actual ---\n{actual}\n--- expected ---\n{expected}");
}

pub fn assert_no_action(provider: &str, marked: &str) {
    let (_, outcome) = run_provider(provider, marked);
    assert!(matches!(outcome, Outcome::NoMatch), "expected no action from {provider}, got {outcome:?}");
}
