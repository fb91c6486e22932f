mod common;

use common::{assert_no_action, assert_refactors, canonical, refactor, run_provider, single_action, split_cursor};
use insta::assert_snapshot;
use refactorkit::refactor::use_as_null_check::{ID, TITLE};
use refactorkit::refactor::Severity;
use refactorkit::{ApplyError, Document};

#[test]
fn empty_case() {
    assert_refactors(
        ID,
        r#"
class Bar
{
    public Bar Baz (object foo)
    {
        if (foo $is Bar) {
        }
        return null;
    }
}
"#,
        r#"
class Bar
{
    public Bar Baz (object foo)
    {
        var bar = foo as Bar;
        if (bar != null) {
        }
        return null;
    }
}
"#,
    );
}

#[test]
fn simple_case() {
    let actual = refactor(
        ID,
        r#"
class Bar
{
    public Bar Baz (object foo)
    {
        if (foo $is Bar) {
            Baz ((Bar)foo);
            return (Bar)foo;
        }
        return null;
    }
}
"#,
    );
    assert_snapshot!(actual, @r###"
    class Bar {
        public Bar Baz(object foo) {
            var bar = foo as Bar;
            if (bar != null) {
                Baz(bar);
                return bar;
            }
            return null;
        }
    }
    "###);
}

#[test]
fn keyword_binding_names_are_escaped() {
    assert_refactors(
        ID,
        r#"
class Int
{
    public Int Baz (object foo)
    {
        if (foo $is Int) {
            Baz ((Int)foo);
            return (Int)foo;
        }
        return null;
    }
}
"#,
        r#"
class Int
{
    public Int Baz (object foo)
    {
        var @int = foo as Int;
        if (@int != null) {
            Baz (@int);
            return @int;
        }
        return null;
    }
}
"#,
    );
}

#[test]
fn negated_case_leaves_failing_branch_alone() {
    assert_refactors(
        ID,
        r#"
class Bar
{
    public Bar Baz (object foo)
    {
        if (!(foo $is Bar)) {
            Baz ((Bar)foo);
        }
        return null;
    }
}
"#,
        r#"
class Bar
{
    public Bar Baz (object foo)
    {
        var bar = foo as Bar;
        if (bar == null) {
            Baz ((Bar)foo);
        }
        return null;
    }
}
"#,
    );
}

#[test]
fn negated_else_if_is_wrapped_in_a_block() {
    let actual = refactor(
        ID,
        r#"
class Bar
{
    public Bar Baz (object foo)
    {
        if (true) {
        } else if (!(foo $is Bar)) {
            Baz ((Bar)foo);
        }
        return null;
    }
}
"#,
    );
    assert_snapshot!(actual, @r###"
    class Bar {
        public Bar Baz(object foo) {
            if (true) {
            } else {
                var bar = foo as Bar;
                if (bar == null) {
                    Baz((Bar)foo);
                }
            }
            return null;
        }
    }
    "###);
}

#[test]
fn complex_case_normalizes_every_cast_form() {
    assert_refactors(
        ID,
        r#"
class Bar
{
    public IDisposable Baz (object foo)
    {
        if (((foo) $is Bar)) {
            Baz ((Bar)foo);
            Baz (foo as Bar);
            Baz (((foo) as Bar));
            Baz ((Bar)(foo));
            return (IDisposable)foo;
        }
        return null;
    }
}
"#,
        r#"
class Bar
{
    public IDisposable Baz (object foo)
    {
        var bar = (foo) as Bar;
        if (bar != null) {
            Baz (bar);
            Baz (bar);
            Baz (bar);
            Baz (bar);
            return (IDisposable)foo;
        }
        return null;
    }
}
"#,
    );
}

#[test]
fn if_else_rewrites_only_the_positive_branch() {
    assert_refactors(
        ID,
        r#"
class Bar
{
    public Bar Baz (object foo)
    {
        if (foo $is Bar) {
            Baz ((Bar)foo);
            return (Bar)foo;
        } else {
            Console.WriteLine ("Hello World ");
            Baz ((Bar)foo);
        }
        return null;
    }
}
"#,
        r#"
class Bar
{
    public Bar Baz (object foo)
    {
        var bar = foo as Bar;
        if (bar != null) {
            Baz (bar);
            return bar;
        } else {
            Console.WriteLine ("Hello World ");
            Baz ((Bar)foo);
        }
        return null;
    }
}
"#,
    );
}

#[test]
fn nested_if_is_confined_to_its_branch() {
    assert_refactors(
        ID,
        r#"
class Bar
{
    public Bar Baz (object foo)
    {
        if (foo is string) {
        } else if (foo $is Bar) {
            Baz ((Bar)foo);
            return (Bar)foo;
        }

        return (Bar)foo;
    }
}
"#,
        r#"
class Bar
{
    public Bar Baz (object foo)
    {
        if (foo is string) {
        } else
        {
            var bar = foo as Bar;
            if (bar != null)
            {
                Baz(bar);
                return bar;
            }
        }

        return (Bar)foo;
    }
}
"#,
    );
}

#[test]
fn negated_case_with_return_guards_following_statements() {
    assert_refactors(
        ID,
        r#"
class Bar
{
    public Bar Baz (object foo)
    {
        if (!(foo $is Bar))
            return null;
        Baz ((Bar)foo);
        return (Bar)foo;
    }
}
"#,
        r#"
class Bar
{
    public Bar Baz (object foo)
    {
        var bar = foo as Bar;
        if (bar == null)
            return null;
        Baz (bar);
        return bar;
    }
}
"#,
    );
}

#[test]
fn negated_case_with_break_stays_inside_the_loop() {
    assert_refactors(
        ID,
        r#"
class Bar
{
    public Bar Baz (object foo)
    {
        for (int i = 0; i < 10; i++) {
            if (!(foo $is Bar))
                break;
            Baz ((Bar)foo);
        }
        return (Bar)foo;
    }
}
"#,
        r#"
class Bar
{
    public Bar Baz (object foo)
    {
        for (int i = 0; i < 10; i++) {
            var bar = foo as Bar;
            if (bar == null)
                break;
            Baz (bar);
        }
        return (Bar)foo;
    }
}
"#,
    );
}

#[test]
fn reassignment_in_else_branch_taints_following_statements() {
    assert_refactors(
        ID,
        r#"
class Bar
{
    public Bar Baz (object foo)
    {
        for (int i = 0; i < 10; i++) {
            if (!(foo $is Bar)) {
                continue;
            } else {
                foo = new Bar ();
            }
            Baz ((Bar)foo);
        }
        return (Bar)foo;
    }
}
"#,
        r#"
class Bar
{
    public Bar Baz (object foo)
    {
        for (int i = 0; i < 10; i++) {
            var bar = foo as Bar;
            if (bar == null) {
                continue;
            } else {
                foo = new Bar ();
            }
            Baz ((Bar)foo);
        }
        return (Bar)foo;
    }
}
"#,
    );
}

#[test]
fn continue_without_reassignment_guards_following_statements() {
    assert_refactors(
        ID,
        r#"
class Bar
{
    public Bar Baz (object foo)
    {
        for (int i = 0; i < 10; i++) {
            if (!(foo $is Bar)) {
                continue;
            }
            Baz ((Bar)foo);
        }
        return null;
    }
}
"#,
        r#"
class Bar
{
    public Bar Baz (object foo)
    {
        for (int i = 0; i < 10; i++) {
            var bar = foo as Bar;
            if (bar == null) {
                continue;
            }
            Baz (bar);
        }
        return null;
    }
}
"#,
    );
}

#[test]
fn conditional_case_rewrites_guarded_operands() {
    assert_refactors(
        ID,
        r#"
class Bar
{
    bool x;
    bool y;
    public Bar Baz (object foo)
    {
        if (((Bar)foo).y && foo $is Bar && ((Bar)foo).x) {
            Baz ((Bar)foo);
        }
        return null;
    }
}
"#,
        r#"
class Bar
{
    bool x;
    bool y;
    public Bar Baz (object foo)
    {
        var bar = foo as Bar;
        if (((Bar)foo).y && bar != null && bar.x) {
            Baz (bar);
        }
        return null;
    }
}
"#,
    );
}

#[test]
fn negated_or_guards_the_right_operand() {
    assert_refactors(
        ID,
        r#"
class Bar
{
    bool y;
    public Bar Baz (object foo)
    {
        if (!(foo $is Bar) || ((Bar)foo).y) {
            Baz ((Bar)foo);
        }
        return null;
    }
}
"#,
        r#"
class Bar
{
    bool y;
    public Bar Baz (object foo)
    {
        var bar = foo as Bar;
        if (bar == null || bar.y) {
            Baz ((Bar)foo);
        }
        return null;
    }
}
"#,
    );
}

#[test]
fn reassignment_stops_rewriting() {
    assert_refactors(
        ID,
        r#"
class Bar
{
    public Bar Baz (object foo)
    {
        if (foo $is Bar) {
            Baz ((Bar)foo);
            foo = null;
            Baz ((Bar)foo);
        }
        return null;
    }
}
"#,
        r#"
class Bar
{
    public Bar Baz (object foo)
    {
        var bar = foo as Bar;
        if (bar != null) {
            Baz (bar);
            foo = null;
            Baz ((Bar)foo);
        }
        return null;
    }
}
"#,
    );
}

#[test]
fn loop_that_reassigns_is_left_alone() {
    assert_refactors(
        ID,
        r#"
class Bar
{
    public Bar Baz (object foo)
    {
        if (foo $is Bar) {
            while (foo != null) {
                Baz ((Bar)foo);
                foo = null;
            }
            return (Bar)foo;
        }
        return null;
    }
}
"#,
        r#"
class Bar
{
    public Bar Baz (object foo)
    {
        var bar = foo as Bar;
        if (bar != null) {
            while (foo != null) {
                Baz ((Bar)foo);
                foo = null;
            }
            return (Bar)foo;
        }
        return null;
    }
}
"#,
    );
}

#[test]
fn embedded_loop_body_is_wrapped() {
    assert_refactors(
        ID,
        r#"
class Bar
{
    public void Baz (object foo, bool go)
    {
        while (go)
            if (foo $is Bar)
                Use ((Bar)foo);
    }
}
"#,
        r#"
class Bar
{
    public void Baz (object foo, bool go)
    {
        while (go) {
            var bar = foo as Bar;
            if (bar != null)
                Use (bar);
        }
    }
}
"#,
    );
}

#[test]
fn member_access_path_is_rewritten() {
    assert_refactors(
        ID,
        r#"
class Bar
{
    object item;
    public Bar Baz ()
    {
        if (this.item $is Bar) {
            return (Bar)this.item;
        }
        return null;
    }
}
"#,
        r#"
class Bar
{
    object item;
    public Bar Baz ()
    {
        var bar = this.item as Bar;
        if (bar != null) {
            return bar;
        }
        return null;
    }
}
"#,
    );
}

#[test]
fn writing_an_intermediate_member_stops_rewriting() {
    assert_refactors(
        ID,
        r#"
class Node
{
    public Node next;
    public object val;
    public Bar Baz (Node a, Node other)
    {
        if (a.next.val $is Bar) {
            Use ((Bar)a.next.val);
            a.next = other;
            return (Bar)a.next.val;
        }
        return null;
    }
}
class Bar { }
"#,
        r#"
class Node
{
    public Node next;
    public object val;
    public Bar Baz (Node a, Node other)
    {
        var bar = a.next.val as Bar;
        if (bar != null) {
            Use (bar);
            a.next = other;
            return (Bar)a.next.val;
        }
        return null;
    }
}
class Bar { }
"#,
    );
}

#[test]
fn field_path_and_shadowing_name_are_distinct() {
    assert_refactors(
        ID,
        r#"
class Bar
{
    object foo;
    public Bar Baz (object foo)
    {
        if (this.foo $is Bar) {
            Use ((Bar)this.foo);
            return (Bar)foo;
        }
        return null;
    }
}
"#,
        r#"
class Bar
{
    object foo;
    public Bar Baz (object foo)
    {
        var bar = this.foo as Bar;
        if (bar != null) {
            Use (bar);
            return (Bar)foo;
        }
        return null;
    }
}
"#,
    );
}

#[test]
fn call_results_get_binding_but_casts_stay() {
    assert_refactors(
        ID,
        r#"
class Bar
{
    object Get () { return null; }
    public void Baz ()
    {
        if (Get () $is Bar) {
            Use ((Bar)Get ());
        }
    }
}
"#,
        r#"
class Bar
{
    object Get () { return null; }
    public void Baz ()
    {
        var bar = Get () as Bar;
        if (bar != null) {
            Use ((Bar)Get ());
        }
    }
}
"#,
    );
}

#[test]
fn binding_name_avoids_collisions() {
    assert_refactors(
        ID,
        r#"
class Bar
{
    public Bar Baz (object foo, Bar bar)
    {
        if (foo $is Bar) {
            return (Bar)foo;
        }
        return bar;
    }
}
"#,
        r#"
class Bar
{
    public Bar Baz (object foo, Bar bar)
    {
        var bar1 = foo as Bar;
        if (bar1 != null) {
            return bar1;
        }
        return bar;
    }
}
"#,
    );
}

#[test]
fn value_type_target_is_rejected() {
    assert_no_action(
        ID,
        r#"
class Bar
{
    public int Baz (object foo)
    {
        if (foo $is int) {
            Baz ((int)foo);
            return (int)foo;
        }
        return 0;
    }
}
"#,
    );
}

#[test]
fn negated_value_type_target_is_rejected() {
    assert_no_action(
        ID,
        r#"
class Bar
{
    public int Baz (object foo)
    {
        if (!(foo $is int)) {
        }
        return 0;
    }
}
"#,
    );
}

#[test]
fn value_typed_operand_is_rejected() {
    assert_no_action(
        ID,
        r#"
class Bar
{
    public void Baz (int foo)
    {
        if (foo $is Bar) {
        }
    }
}
"#,
    );
}

#[test]
fn unknown_target_type_is_rejected() {
    assert_no_action(
        ID,
        r#"
class Bar
{
    public void Baz (object foo)
    {
        if (foo $is Missing) {
        }
    }
}
"#,
    );
}

#[test]
fn cursor_must_be_on_the_keyword() {
    assert_no_action(
        ID,
        r#"
class Bar
{
    public void Baz (object foo)
    {
        if ($foo is Bar) {
        }
    }
}
"#,
    );
}

#[test]
fn test_outside_if_condition_is_rejected() {
    assert_no_action(
        ID,
        r#"
class Bar
{
    public bool Baz (object foo)
    {
        return foo $is Bar;
    }
}
"#,
    );
}

#[test]
fn action_metadata() {
    let marked = r#"
class Bar
{
    public void Baz (object foo)
    {
        if (foo $is Bar) {
        }
    }
}
"#;
    let (_, action) = single_action(ID, marked);
    let (_, cursor) = split_cursor(marked);
    assert_eq!(action.provider(), ID);
    assert_eq!(action.title(), TITLE);
    assert_eq!(action.severity(), Severity::Info);
    assert_eq!(action.span().start, cursor.start);
    assert_eq!(action.span().len(), 2);
}

#[test]
fn apply_is_deterministic_and_rejects_stale_documents() {
    let marked = r#"
class Bar
{
    public Bar Baz (object foo)
    {
        if (foo $is Bar) {
            return (Bar)foo;
        }
        return null;
    }
}
"#;
    let (doc, action) = single_action(ID, marked);
    let first = action.apply(&doc).unwrap();
    let second = action.apply(&doc).unwrap();
    assert_eq!(first, second);

    let other = Document::parse("Test.cs", "class Bar { }").unwrap();
    assert!(matches!(action.apply(&other), Err(ApplyError::StalePath { .. })));
}

#[test]
fn input_tree_is_untouched() {
    let marked = r#"
class Bar
{
    public Bar Baz (object foo)
    {
        if (foo $is Bar) {
            return (Bar)foo;
        }
        return null;
    }
}
"#;
    let (doc, outcome) = run_provider(ID, marked);
    let before = doc.clone();
    for action in outcome.into_actions() {
        action.apply(&doc).unwrap();
    }
    assert_eq!(doc, before);
    let (source, _) = split_cursor(marked);
    assert_eq!(doc.text(), canonical(&source));
}
