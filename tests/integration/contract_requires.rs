mod common;

use common::{assert_no_action, assert_refactors, refactor, run_provider_with, split_cursor};
use insta::assert_snapshot;
use refactorkit::refactor::contract_requires::{ID, TITLE};
use refactorkit::EngineConfig;

#[test]
fn inserts_contract_and_using() {
    let actual = refactor(
        ID,
        r#"
class Foo
{
    void Test(string $s)
    {
    }
}
"#,
    );
    assert_snapshot!(actual, @r###"
    using System.Diagnostics.Contracts;

    class Foo {
        void Test(string s) {
            Contract.Requires(s != null);
        }
    }
    "###);
}

#[test]
fn contract_goes_before_existing_statements() {
    assert_refactors(
        ID,
        r#"
using System;
class Foo
{
    public int Test(object a, string $s)
    {
        Console.WriteLine(s);
        return 0;
    }
}
"#,
        r#"
using System;
using System.Diagnostics.Contracts;
class Foo
{
    public int Test(object a, string s)
    {
        Contract.Requires(s != null);
        Console.WriteLine(s);
        return 0;
    }
}
"#,
    );
}

#[test]
fn existing_using_is_not_duplicated() {
    assert_refactors(
        ID,
        r#"
using System.Diagnostics.Contracts;
class Foo
{
    void Test(string $s)
    {
    }
}
"#,
        r#"
using System.Diagnostics.Contracts;
class Foo
{
    void Test(string s)
    {
        Contract.Requires(s != null);
    }
}
"#,
    );
}

#[test]
fn using_lands_in_sorted_position() {
    assert_refactors(
        ID,
        r#"
using System;
using System.Linq;
using Acme.Tools;
class Foo
{
    void Test(string $s)
    {
    }
}
"#,
        r#"
using System;
using System.Diagnostics.Contracts;
using System.Linq;
using Acme.Tools;
class Foo
{
    void Test(string s)
    {
        Contract.Requires(s != null);
    }
}
"#,
    );
}

#[test]
fn existing_contract_suppresses_the_action() {
    assert_no_action(
        ID,
        r#"
using System.Diagnostics.Contracts;
class Foo
{
    void Test(string $s)
    {
        Contract.Requires(s != null);
    }
}
"#,
    );
}

#[test]
fn contract_for_another_parameter_does_not_count() {
    assert_refactors(
        ID,
        r#"
class Foo
{
    void Test(string a, string $b)
    {
        Contract.Requires(a != null);
    }
}
"#,
        r#"
using System.Diagnostics.Contracts;
class Foo
{
    void Test(string a, string b)
    {
        Contract.Requires(b != null);
        Contract.Requires(a != null);
    }
}
"#,
    );
}

#[test]
fn value_typed_parameter_is_rejected() {
    assert_no_action(
        ID,
        r#"
class Foo
{
    void Test(int $n)
    {
    }
}
"#,
    );
}

#[test]
fn nullable_value_type_is_rejected() {
    assert_no_action(
        ID,
        r#"
class Foo
{
    void Test(int? $n)
    {
    }
}
"#,
    );
}

#[test]
fn method_without_body_is_rejected() {
    assert_no_action(
        ID,
        r#"
abstract class Foo
{
    public abstract void Test(string $s);
}
"#,
    );
}

#[test]
fn verbatim_parameter_names_keep_their_escape() {
    assert_refactors(
        ID,
        r#"
class Foo
{
    void Test(string @$int)
    {
    }
}
"#,
        r#"
using System.Diagnostics.Contracts;
class Foo
{
    void Test(string @int)
    {
        Contract.Requires(@int != null);
    }
}
"#,
    );
}

#[test]
fn configured_namespace_is_imported() {
    let config = EngineConfig::from_toml_str("[contracts]\nnamespace = \"Acme.Contracts\"\n").unwrap();
    let marked = r#"
using System;
class Foo
{
    void Test(string $s)
    {
    }
}
"#;
    let (doc, outcome) = run_provider_with(ID, marked, &config);
    let actions = outcome.into_actions();
    assert_eq!(actions.len(), 1);
    let text = actions[0].apply(&doc).unwrap().text();
    assert!(text.starts_with("using System;\nusing Acme.Contracts;\n"), "{text}");
}

#[test]
fn action_is_anchored_on_the_parameter_name() {
    let marked = r#"
class Foo
{
    void Test(string $value)
    {
    }
}
"#;
    let (_, outcome) = run_provider_with(ID, marked, &EngineConfig::default());
    let actions = outcome.into_actions();
    let (_, cursor) = split_cursor(marked);
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].title(), TITLE);
    assert_eq!(actions[0].span().start, cursor.start);
    assert_eq!(actions[0].span().len(), "value".len());
}
