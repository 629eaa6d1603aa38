use camino::Utf8Path;
use pretty_assertions::assert_eq;
use scoped_styles::{
    strip_definitions, MessageCode, Messages, ScopeRenamer, SelectorCatalog, UrlRewriter,
    VariableResolver, VariableTable,
};
use style_parser::{
    emit_stylesheet, emit_template, parse_stylesheet, parse_template, EmitOptions, Stylesheet,
};

/// Runs catalog, table, resolver and stripper the way the pipeline does.
fn resolve(source: &str) -> (Stylesheet, Messages) {
    let result = parse_stylesheet("test.css", source);
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    let mut stylesheet = result.stylesheet;
    let table = VariableTable::collect(&stylesheet);
    let mut messages = Messages::new();
    VariableResolver::new(&table).resolve(&mut stylesheet, &mut messages);
    strip_definitions(&mut stylesheet);
    (stylesheet, messages)
}

fn compact(stylesheet: &Stylesheet) -> String {
    emit_stylesheet(stylesheet, &EmitOptions::compact())
}

#[test]
fn test_stripping_is_idempotent() {
    let (mut sheet, _) = resolve("@a: 1px;\n.x { var-b: 2px; margin: var(a) var(b); }");
    let once = compact(&sheet);
    assert_eq!(strip_definitions(&mut sheet), 0);
    assert_eq!(compact(&sheet), once);
    assert_eq!(once, ".x { margin: 1px 2px; }");
}

#[test]
fn test_chain_resolution() {
    let (sheet, messages) = resolve("@a: var(b); @b: var(c); @c: red;\n.x { color: var(a); }");
    assert!(messages.is_empty());
    assert_eq!(compact(&sheet), ".x { color: red; }");
}

#[test]
fn test_cycle_completeness_from_any_start() {
    for source in [
        "@one: var(two); @two: var(one);",
        "@two: var(one); @one: var(two);",
        ".a { top: var(two); } @one: var(two); @two: var(one);",
    ] {
        let (_, messages) = resolve(source);
        let mut texts: Vec<_> = messages.iter().map(|m| m.text.clone()).collect();
        texts.sort();
        assert_eq!(
            texts,
            ["var cycle detected var-one", "var cycle detected var-two"],
            "for {source}"
        );
        assert!(messages.iter().all(|m| m.code == MessageCode::VarCycle));
    }
}

#[test]
fn test_multi_term_splice() {
    let (sheet, _) = resolve("@x: 1px solid red;\n.a { border: var(x); }");
    assert_eq!(compact(&sheet), ".a { border: 1px solid red; }");
}

#[test]
fn test_default_fallback() {
    let (sheet, _) = resolve(".a { color: var(undefined-name, blue); }");
    assert_eq!(compact(&sheet), ".a { color: blue; }");
}

#[test]
fn test_scoping_selectivity() {
    let sheet = parse_stylesheet("x-foo.css", ".main { top: 0; }").stylesheet;
    let catalog = SelectorCatalog::collect(&sheet);
    let mut nodes = parse_template("x-foo.html", r#"<div class="main external"></div>"#)
        .document
        .nodes;
    ScopeRenamer::new(&catalog, Some("x-foo")).rename(&mut nodes);
    assert_eq!(emit_template(&nodes), r#"<div class="x-foo_main external"></div>"#);
}

#[test]
fn test_network_urls_pass_through() {
    let source = ".a { background: url(http://example.com/a.png); }";
    for (from, to) in [
        ("src/a.html", "out/a.css"),
        ("a.html", "deep/er/a.css"),
        ("/abs/src/a.html", "/abs/a.css"),
    ] {
        let mut sheet = parse_stylesheet(from, source).stylesheet;
        UrlRewriter::new(Utf8Path::new(from), Utf8Path::new(to)).rewrite(&mut sheet);
        assert_eq!(compact(&sheet), source);
    }
}

#[test]
fn test_null_prefix_is_a_no_op() {
    let sheet = parse_stylesheet("x.css", ".main, .other, #header { top: 0; }").stylesheet;
    let catalog = SelectorCatalog::collect(&sheet);
    let source = r#"<section id="header" class="main  other"><p class="main x">t</p></section>"#;
    let mut nodes = parse_template("x.html", source).document.nodes;
    ScopeRenamer::new(&catalog, None).rename(&mut nodes);
    assert_eq!(emit_template(&nodes), source);
}
