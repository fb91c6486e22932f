//! Parse, print, parse again: the printer's output is a fixed point.
use refactorkit::diagnostics::render_syntax_error;
use refactorkit::parser::parse_unit;
use refactorkit::pretty::pretty_print;
use refactorkit::Document;

fn assert_fixed_point(source: &str) {
    let first = pretty_print(&parse_unit(source).unwrap());
    let second = pretty_print(&parse_unit(&first).unwrap_or_else(|e| panic!("reparse failed: {e}\n{first}")));
    assert_eq!(first, second);
}

#[test]
fn usings_and_members() {
    assert_fixed_point(
        r#"
using System;
using System.Diagnostics.Contracts;

public class Bar : IDisposable
{
    private object item;
    static int count = 0;

    public Bar() { }
    public abstract void Run(string s);
    public Bar Baz(object foo, int? n, string[] names) { return null; }
}

struct Point { int x; int y; }
enum Color { Red, Green, Blue }
"#,
    );
}

#[test]
fn statements() {
    assert_fixed_point(
        r#"
class A
{
    void M(object foo, bool go)
    {
        var x = 1;
        int y;
        ;
        { x++; --x; }
        while (go) if (foo is A) break; else continue;
        for (int i = 0; i < 10; i++, x += 2) { }
        for (;;) { return; }
        foreach (var item in foo) throw;
        if (x == 1) { } else if (x != 2) { } else { }
        throw new Exception("bad");
    }
}
"#,
    );
}

#[test]
fn expressions_keep_their_grouping() {
    assert_fixed_point(
        r#"
class A
{
    bool M(object foo)
    {
        var a = (1 + 2) * 3 - -4 / 2 % 5;
        var b = !(foo is A) || foo != null && ((A)foo).M(this.item);
        var c = (foo as A).M(null);
        @class = "s" + 1;
        return a <= 3 && b;
    }
}
"#,
    );
}

#[test]
fn printing_normalizes_layout() {
    let compact = "class A{void M(object foo){if(foo is A){Use((A)foo);}}}";
    let spaced = "class A\n{\n  void M (object foo)\n  {\n    if (foo is A)\n    {\n      Use ( (A) foo );\n    }\n  }\n}\n";
    assert_eq!(pretty_print(&parse_unit(compact).unwrap()), pretty_print(&parse_unit(spaced).unwrap()));
}

#[test]
fn document_text_is_printed_source() {
    let doc = Document::parse("A.cs", "class A { }").unwrap();
    assert_eq!(doc.name, "A.cs");
    assert_eq!(doc.text(), "class A {\n}\n");
}

#[test]
fn syntax_errors_render_with_position() {
    let source = "class A\n{\n    void M() { var x = ; }\n}";
    let err = parse_unit(source).unwrap_err();
    let rendered = render_syntax_error(source, &err);
    assert!(rendered.starts_with("3:"), "{rendered}");
    assert!(rendered.contains("void M() { var x = ; }"), "{rendered}");
    assert!(rendered.contains('^'));
}

#[test]
fn unterminated_input_is_an_error() {
    assert!(parse_unit("class A { void M() { if (x").is_err());
    assert!(parse_unit("class").is_err());
}
