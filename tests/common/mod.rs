#![allow(dead_code)]

use foreman_analysis::{
    Compilation, Diagnostic, Parser, SourceText, TokenKind, VariableIdentifier, compile, tokenize,
};

/// What running one grammar rule over a whole input produced.
pub struct RuleOutcome<T> {
    pub node: Option<T>,
    pub diagnostics: Vec<Diagnostic>,
    /// Whether the rule consumed everything up to EOF.
    pub at_eof: bool,
}

pub fn run_rule<T>(input: &str, rule: impl FnOnce(&mut Parser<'_>) -> Option<T>) -> RuleOutcome<T> {
    let text = SourceText::new(input);
    let tokens = tokenize(&text);
    let mut parser = Parser::new(&tokens);
    let node = rule(&mut parser);
    let at_eof = parser.current().kind == TokenKind::Eof;
    RuleOutcome {
        node,
        diagnostics: parser.into_diagnostics(),
        at_eof,
    }
}

/// The rule returns a node, reports nothing, and consumes all input.
pub fn assert_fully_parsed<T>(input: &str, rule: impl FnOnce(&mut Parser<'_>) -> Option<T>) {
    let outcome = run_rule(input, rule);
    assert!(outcome.node.is_some(), "no node for {input:?}");
    assert!(
        outcome.diagnostics.is_empty(),
        "unexpected diagnostics for {input:?}: {:?}",
        messages(&outcome.diagnostics)
    );
    assert!(outcome.at_eof, "input left over for {input:?}");
}

/// The rule declines, reports something, or leaves input behind.
pub fn assert_not_fully_parsed<T>(input: &str, rule: impl FnOnce(&mut Parser<'_>) -> Option<T>) {
    let outcome = run_rule(input, rule);
    assert!(
        outcome.node.is_none() || !outcome.diagnostics.is_empty() || !outcome.at_eof,
        "{input:?} parsed cleanly"
    );
}

pub fn messages(diagnostics: &[Diagnostic]) -> Vec<String> {
    diagnostics.iter().map(|d| d.message.clone()).collect()
}

pub fn bind_messages(compilation: &Compilation) -> Vec<String> {
    messages(&compilation.bind_diagnostics)
}

/// Compile input that must parse without diagnostics.
pub fn compile_clean_parse(input: &str) -> Compilation {
    let compilation = compile(input);
    assert!(
        compilation.parse_diagnostics.is_empty(),
        "parse diagnostics for {input:?}: {:?}",
        messages(&compilation.parse_diagnostics)
    );
    compilation
}

pub fn var(name: &str) -> VariableIdentifier {
    VariableIdentifier::parse(name).expect("valid variable name")
}

// -----------------------------------------------------------
// Shared inputs.
// -----------------------------------------------------------

pub const PARTIAL_SYMBOLS: &[&str] = &["hello", "a1", "a1a1a1a", "a-a", "a-1", "a-1-a-2-aaa-a-a"];

pub fn compound_symbols() -> Vec<String> {
    PARTIAL_SYMBOLS
        .iter()
        .map(ToString::to_string)
        .chain(["a.b.c.d".to_string(), "a1.b-2.c".to_string()])
        .collect()
}

pub fn namespaced_symbols() -> Vec<String> {
    compound_symbols()
        .into_iter()
        .map(|symbol| format!("example/{symbol}"))
        .chain(
            ["hello/world", "azure/env.code", "a/b/c/d/e/f/g", "who.me/name"]
                .into_iter()
                .map(ToString::to_string),
        )
        .collect()
}

pub fn interpolations() -> Vec<String> {
    namespaced_symbols()
        .into_iter()
        .map(|symbol| format!("@{{{symbol}}}@"))
        .collect()
}

pub const ATTRIBUTE_NAMES: &[&str] = &["myAttr", "my-attr", "MYATTR", "myAttr23"];

pub fn attribute_contents() -> Vec<String> {
    [
        "hello",
        "an english sentence.",
        "123123",
        "~`!@#$%^&*()_-+={}[]\\|",
        "</<!--}@",
        "@{var/value}@",
        "shared-@{azure/env.code}@",
        "@{var/wow}@.@{var/cool}@ and a bottle of @{var/beverage}@",
    ]
    .into_iter()
    .map(ToString::to_string)
    .chain(interpolations())
    .collect()
}

pub fn attributes() -> Vec<String> {
    attribute_contents()
        .iter()
        .flat_map(|contents| {
            ATTRIBUTE_NAMES
                .iter()
                .map(move |name| format!("{name}=\"{contents}\""))
        })
        .collect()
}

pub const COMMENTS: &[&str] = &[
    "<!-- hello -->",
    "<!-- ~`!@#$%^&*()_+-={}|[]\\:\";'<>?,./ -->",
    "<!-- @{}@<//><!-- -->",
    "<!--\n\n\nwow\ncool\r\r\n-->",
];
