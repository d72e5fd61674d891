//! Rendering bound documents with variable values.

mod common;

use common::{compile_clean_parse, var};
use foreman_analysis::{BindingContext, SourceText, SyntaxNode, VariableValueBag, parse, tokenize};

fn render_with(input: &str, values: &VariableValueBag) -> String {
    compile_clean_parse(input).render(values)
}

// -----------------------------------------------------------
// Shapes.
// -----------------------------------------------------------

#[test]
fn render_self_closing() {
    assert_eq!(render_with("<a/>", &VariableValueBag::new()), "<a/>");
}

#[test]
fn render_empty_pair_self_closes() {
    assert_eq!(render_with("<a></a>", &VariableValueBag::new()), "<a/>");
}

#[test]
fn render_drops_whitespace_and_comments() {
    let input = "<!-- head -->\n<job>\n  <!-- note -->\n  <step   name=\"x\" />\n</job>\n";
    assert_eq!(
        render_with(input, &VariableValueBag::new()),
        "<job><step name=\"x\"/></job>"
    );
}

#[test]
fn render_nested_children_in_order() {
    let input = "<job><a><b/><c/></a><d/></job>";
    assert_eq!(render_with(input, &VariableValueBag::new()), input);
}

#[test]
fn render_text_content() {
    assert_eq!(
        render_with("<msg>hello, world</msg>", &VariableValueBag::new()),
        "<msg>hello, world</msg>"
    );
}

// -----------------------------------------------------------
// Substitution.
// -----------------------------------------------------------

#[test]
fn render_substitutes_attribute_values() {
    let input = "<job><b x=\"@{v/k}@\"/></job>";
    let values = VariableValueBag::new().with(var("v/k"), "Z");
    assert_eq!(render_with(input, &values), "<job><b x=\"Z\"/></job>");
}

#[test]
fn render_unset_variable_is_empty() {
    let input = "<job><b x=\"@{v/k}@\"/></job>";
    assert_eq!(
        render_with(input, &VariableValueBag::new()),
        "<job><b x=\"\"/></job>"
    );
}

#[test]
fn render_mixed_literals_and_symbols() {
    let input = "<job><run cmd=\"deploy @{app/name}@ --to @{env/name}@\">@{env/name}@-log</run></job>";
    let values: VariableValueBag = [(var("app/name"), "api"), (var("env/name"), "prod")]
        .into_iter()
        .collect();
    assert_eq!(
        render_with(input, &values),
        "<job><run cmd=\"deploy api --to prod\">prod-log</run></job>"
    );
}

#[test]
fn render_deep_namespace() {
    let input = "<job>@{a/b.c/d}@</job>";
    let values = VariableValueBag::new().with(var("a/b.c/d"), "ok");
    assert_eq!(render_with(input, &values), "<job>ok</job>");
}

#[test]
fn render_value_is_not_reparsed() {
    let input = "<job>@{v/k}@</job>";
    let values = VariableValueBag::new().with(var("v/k"), "@{v/k}@");
    assert_eq!(render_with(input, &values), "<job>@{v/k}@</job>");
}

// -----------------------------------------------------------
// Partial documents.
// -----------------------------------------------------------

#[test]
fn render_without_document_is_empty() {
    let compilation = foreman_analysis::compile("   ");
    assert!(compilation.document.is_none());
    assert_eq!(compilation.render(&VariableValueBag::new()), "");
}

#[test]
fn render_skips_unbound_children() {
    let compilation = foreman_analysis::compile("<job><a/><b x=\"1/></job>");
    assert_eq!(
        compilation.render(&VariableValueBag::new()),
        "<job><a/><b/></job>"
    );
}

#[test]
fn render_single_bound_node() {
    let text = SourceText::new("<job><b x=\"@{v/k}@\"/></job>");
    let tokens = tokenize(&text);
    let syntax = parse(&tokens).syntax.expect("syntax");

    let mut context = BindingContext::new(&text);
    let node = context
        .bind(&SyntaxNode::Element(syntax.root))
        .expect("element");
    let values = VariableValueBag::new().with(var("v/k"), "1");
    assert_eq!(node.render(&values), "<job><b x=\"1\"/></job>");
}
