mod common;

use std::io::Write;

use common::split_cursor;
use refactorkit::refactor::{contract_requires, use_as_null_check, CodeAction, Outcome, Provider, Severity};
use refactorkit::syntax::SyntaxKind;
use refactorkit::{
    refactorings_at, ApplyError, CancellationToken, Cancelled, ConfigError, Document, EngineConfig, ProviderRegistry,
    RefactoringContext, SourceModel,
};

const BOTH: &str = r#"
class Bar
{
    public Bar Baz (object foo, string s)
    {
        if (foo is Bar) {
            return (Bar)foo;
        }
        return null;
    }
}
"#;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().with_max_level(tracing::Level::TRACE).try_init();
}

fn actions_at(source: &str, needle: &str, config: &EngineConfig) -> Result<Vec<CodeAction>, Cancelled> {
    let doc = Document::parse("Test.cs", source).unwrap();
    let at = source.find(needle).unwrap();
    refactorings_at(&doc, refactorkit::Span::new(at, at), config, &CancellationToken::new())
}

#[test]
fn default_registry_order() {
    let registry = ProviderRegistry::with_defaults();
    let ids: Vec<_> = registry.ids().collect();
    assert_eq!(ids, vec![use_as_null_check::ID, contract_requires::ID]);
    assert_eq!(registry.get(contract_requires::ID).map(|p| p.trigger), Some(SyntaxKind::Parameter));
    assert!(registry.get("missing").is_none());
}

#[test]
fn cursor_selects_the_provider() {
    init_tracing();
    let config = EngineConfig::default();

    let on_is = actions_at(BOTH, "is Bar", &config).unwrap();
    assert_eq!(on_is.len(), 1);
    assert_eq!(on_is[0].provider(), use_as_null_check::ID);

    let on_param = actions_at(BOTH, "s)", &config).unwrap();
    assert_eq!(on_param.len(), 1);
    assert_eq!(on_param[0].provider(), contract_requires::ID);

    let elsewhere = actions_at(BOTH, "return null", &config).unwrap();
    assert!(elsewhere.is_empty());
}

#[test]
fn disabled_providers_do_not_run() {
    let config = EngineConfig::from_toml_str(
        r#"
[providers]
disabled = ["use-as-and-null-check"]
"#,
    )
    .unwrap();
    assert!(actions_at(BOTH, "is Bar", &config).unwrap().is_empty());
    assert_eq!(actions_at(BOTH, "s)", &config).unwrap().len(), 1);
}

#[test]
fn cancelled_token_yields_no_partial_list() {
    let doc = Document::parse("Test.cs", BOTH).unwrap();
    let at = BOTH.find("is Bar").unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let result = refactorings_at(&doc, refactorkit::Span::new(at, at), &EngineConfig::default(), &cancel);
    assert_eq!(result.unwrap_err(), Cancelled);
}

#[test]
fn cancellation_from_another_thread_is_observed() {
    let cancel = CancellationToken::new();
    let remote = cancel.clone();
    std::thread::spawn(move || remote.cancel()).join().unwrap();
    assert!(cancel.check().is_err());
}

#[test]
fn concurrent_requests_share_a_document() {
    let doc = Document::parse("Test.cs", BOTH).unwrap();
    let config = EngineConfig::default();
    let expected = {
        let at = BOTH.find("is Bar").unwrap();
        let actions =
            refactorings_at(&doc, refactorkit::Span::new(at, at), &config, &CancellationToken::new()).unwrap();
        actions[0].apply(&doc).unwrap()
    };

    let (doc, config) = (&doc, &config);
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(move || {
                    let at = BOTH.find("is Bar").unwrap();
                    let actions =
                        refactorings_at(doc, refactorkit::Span::new(at, at), config, &CancellationToken::new())
                            .unwrap();
                    actions[0].apply(doc).unwrap()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn actions_can_be_sent_to_other_threads() {
    let doc = Document::parse("Test.cs", BOTH).unwrap();
    let at = BOTH.find("s)").unwrap();
    let actions =
        refactorings_at(&doc, refactorkit::Span::new(at, at), &EngineConfig::default(), &CancellationToken::new())
            .unwrap();
    let action = actions.into_iter().next().unwrap();
    let applied = std::thread::spawn(move || action.apply(&doc)).join().unwrap().unwrap();
    assert!(applied.text().contains("Contract.Requires(s != null);"));
}

#[test]
fn action_info_serializes_for_hosts() {
    let actions = actions_at(BOTH, "is Bar", &EngineConfig::default()).unwrap();
    let info = actions[0].info();
    let json = serde_json::to_value(&info).unwrap();
    assert_eq!(json["provider"], "use-as-and-null-check");
    assert_eq!(json["title"], use_as_null_check::TITLE);
    assert_eq!(json["severity"], "info");
    assert_eq!(json["end"].as_u64().unwrap() - json["start"].as_u64().unwrap(), 2);
}

#[test]
fn applying_to_an_edited_document_is_stale() {
    let doc = Document::parse("Test.cs", BOTH).unwrap();
    let at = BOTH.find("s)").unwrap();
    let actions =
        refactorings_at(&doc, refactorkit::Span::new(at, at), &EngineConfig::default(), &CancellationToken::new())
            .unwrap();
    let applied = actions[0].apply(&doc).unwrap();

    let edited = Document::parse("Test.cs", "class Bar { }").unwrap();
    let err = actions[0].apply(&edited).unwrap_err();
    assert!(matches!(err, ApplyError::StalePath { ref document, .. } if document == "Test.cs"));
    assert!(err.to_string().starts_with("Stale edit"));

    // The first result is unaffected by the failed attempt.
    assert!(applied.text().contains("Contract.Requires"));
}

fn always_offers(ctx: &RefactoringContext<'_>) -> Result<Outcome, Cancelled> {
    ctx.cancel.check()?;
    let action = CodeAction::new("identity", ctx.span, Severity::Hidden, "Do nothing", |doc: &Document| Ok(doc.clone()));
    Ok(Outcome::Actions(vec![action]))
}

#[test]
fn custom_providers_register_and_replace() {
    let mut registry = ProviderRegistry::with_defaults();
    registry.register(Provider { id: "identity", trigger: SyntaxKind::Return, compute: always_offers });
    registry.register(Provider { id: "identity", trigger: SyntaxKind::IsExpr, compute: always_offers });
    assert_eq!(registry.providers().len(), 3);

    let (source, cursor) = split_cursor(&BOTH.replace("foo is", "foo $is"));
    let doc = Document::parse("Test.cs", &source).unwrap();
    let model = SourceModel::new(&doc.root);
    let cancel = CancellationToken::new();
    let config = EngineConfig::default();
    let ctx = RefactoringContext::new(&doc, &model, cursor, &cancel, &config);

    let actions = registry.compute_actions(&ctx).unwrap();
    let providers: Vec<_> = actions.iter().map(CodeAction::provider).collect();
    assert_eq!(providers, vec![use_as_null_check::ID, "identity"]);
    assert_eq!(actions[1].apply(&doc).unwrap(), doc);
    assert!(matches!(registry.run("missing", &ctx), Ok(Outcome::NoMatch)));
}

#[test]
fn config_loads_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[contracts]\nnamespace = \"Acme.Contracts\"\n\n[scan]\ncheck_interval = 8").unwrap();
    let config = EngineConfig::load(file.path()).unwrap();
    assert_eq!(config.contracts.namespace, "Acme.Contracts");
    assert_eq!(config.scan.check_interval, 8);
    assert!(config.is_enabled(contract_requires::ID));
}

#[test]
fn config_errors_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    assert!(matches!(EngineConfig::load(&missing), Err(ConfigError::Io { .. })));
    assert!(matches!(EngineConfig::from_toml_str("[unknown]\nkey = 1\n"), Err(ConfigError::Parse(_))));
}
