//! Semantic classification and its LSP encoding.

use foreman_analysis::semantic::semantic_tokens;
use foreman_analysis::{
    Parser, SemanticToken, SemanticTokenKind, SourceText, SyntaxNode, compile, encode_relative,
    tokenize,
};

use SemanticTokenKind::{Attribute, Comment, Element, InterpolatedBlock, Variable};

const fn token(kind: SemanticTokenKind, line: usize, start: usize, length: usize) -> SemanticToken {
    SemanticToken {
        kind,
        line,
        start,
        length,
    }
}

fn classify(input: &str) -> Vec<SemanticToken> {
    compile(input).semantic_tokens()
}

// -----------------------------------------------------------
// Elements and comments.
// -----------------------------------------------------------

#[test]
fn self_closing_element() {
    assert_eq!(
        classify("<job/>"),
        vec![
            token(Element, 0, 0, 1),
            token(Element, 0, 1, 3),
            token(Element, 0, 4, 2),
        ]
    );
}

#[test]
fn paired_element_with_comment_child() {
    assert_eq!(
        classify("<a><!-- c --></a>"),
        vec![
            token(Element, 0, 0, 1),
            token(Element, 0, 1, 1),
            token(Element, 0, 2, 1),
            token(Comment, 0, 3, 10),
            token(Element, 0, 13, 4),
        ]
    );
}

#[test]
fn comment_across_two_lines_explodes() {
    assert_eq!(
        classify("     <!--\na-->"),
        vec![token(Comment, 0, 5, 5), token(Comment, 1, 0, 4)]
    );
}

#[test]
fn closing_tag_across_three_lines_explodes() {
    let tokens = classify("<hello></\nhello\n>");
    assert_eq!(
        &tokens[3..],
        &[
            token(Element, 0, 7, 3),
            token(Element, 1, 0, 6),
            token(Element, 2, 0, 1),
        ]
    );
}

#[test]
fn every_token_sits_on_one_line() {
    let input = "<!--\none\ntwo\n-->\n<job>\n</\njob\n>";
    let compilation = compile(input);
    for token in compilation.semantic_tokens() {
        let line_len = compilation.text.line_len(token.line).expect("line");
        assert!(token.end() < line_len, "{token:?} overruns its line");
    }
}

#[test]
fn trailing_comment_is_classified() {
    let tokens = classify("<a/>\n<!-- end -->");
    assert_eq!(tokens.last(), Some(&token(Comment, 1, 0, 12)));
}

// -----------------------------------------------------------
// Attributes.
// -----------------------------------------------------------

#[test]
fn attribute_string_runs_around_interpolation() {
    assert_eq!(
        classify("<a x=\"p@{v/k}@q\"/>"),
        vec![
            token(Element, 0, 0, 1),
            token(Element, 0, 1, 1),
            token(Attribute, 0, 3, 1),
            token(SemanticTokenKind::String, 0, 5, 2),
            token(InterpolatedBlock, 0, 7, 2),
            token(Variable, 0, 9, 3),
            token(InterpolatedBlock, 0, 12, 2),
            token(SemanticTokenKind::String, 0, 14, 2),
            token(Element, 0, 16, 2),
        ]
    );
}

#[test]
fn plain_attribute_is_one_string() {
    let tokens = classify("<a key=\"some value\"/>");
    assert_eq!(tokens[2], token(Attribute, 0, 3, 3));
    assert_eq!(tokens[3], token(SemanticTokenKind::String, 0, 7, 12));
}

#[test]
fn empty_attribute_value_is_both_quotes() {
    let tokens = classify("<a x=\"\"/>");
    assert_eq!(tokens[3], token(SemanticTokenKind::String, 0, 5, 2));
}

#[test]
fn interpolation_only_value_keeps_quotes_apart() {
    let tokens = classify("<a x=\"@{v/k}@\"/>");
    let kinds: Vec<_> = tokens[3..8].iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        [
            SemanticTokenKind::String,
            InterpolatedBlock,
            Variable,
            InterpolatedBlock,
            SemanticTokenKind::String
        ]
    );
    assert_eq!(tokens[3].length, 1);
    assert_eq!(tokens[7].length, 1);
}

#[test]
fn unterminated_attribute_value_is_still_a_string() {
    let tokens = classify("<a x=\"ab");
    assert_eq!(tokens.last(), Some(&token(SemanticTokenKind::String, 0, 5, 3)));
}

#[test]
fn attribute_without_value() {
    assert_eq!(
        classify("<a x="),
        vec![
            token(Element, 0, 0, 1),
            token(Element, 0, 1, 1),
            token(Attribute, 0, 3, 1),
        ]
    );
}

#[test]
fn attribute_node_alone() {
    let text = SourceText::new("name=\"@{ns/key}@\"");
    let tokens = tokenize(&text);
    let attribute = Parser::new(&tokens).parse_attribute().expect("attribute");
    let kinds: Vec<_> = semantic_tokens(&text, &SyntaxNode::Attribute(attribute))
        .iter()
        .map(|t| t.kind)
        .collect();
    assert_eq!(
        kinds,
        [
            Attribute,
            SemanticTokenKind::String,
            InterpolatedBlock,
            Variable,
            InterpolatedBlock,
            SemanticTokenKind::String
        ]
    );
}

// -----------------------------------------------------------
// Content.
// -----------------------------------------------------------

#[test]
fn element_content_only_marks_interpolations() {
    let tokens = classify("<job>run @{a/b}@ now</job>");
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        [
            Element,
            Element,
            Element,
            InterpolatedBlock,
            Variable,
            InterpolatedBlock,
            Element
        ]
    );
    assert_eq!(tokens[4], token(Variable, 0, 11, 3));
}

#[test]
fn incomplete_interpolation_marks_what_parsed() {
    let tokens = classify("<job>@{a/b</job>");
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        [Element, Element, Element, InterpolatedBlock, Variable, Element]
    );
}

// -----------------------------------------------------------
// Encoding.
// -----------------------------------------------------------

#[test]
fn relative_encoding_of_a_document() {
    let tokens = classify("<a>\n<b/>\n</a>");
    assert_eq!(
        encode_relative(&tokens),
        vec![
            0, 0, 1, 1, 0, //
            0, 1, 1, 1, 0, //
            0, 1, 1, 1, 0, //
            1, 0, 1, 1, 0, //
            0, 1, 1, 1, 0, //
            0, 1, 2, 1, 0, //
            1, 0, 4, 1, 0,
        ]
    );
}

#[test]
fn legend_order_is_stable() {
    assert_eq!(
        SemanticTokenKind::LEGEND,
        [
            "comment",
            "element",
            "variableValue",
            "attribute",
            "string",
            "variableInterpolation"
        ]
    );
    for (index, kind) in SemanticTokenKind::ALL.into_iter().enumerate() {
        assert_eq!(kind.index() as usize, index);
    }
}

#[test]
fn no_syntax_no_tokens() {
    assert!(classify("").is_empty());
    assert!(encode_relative(&[]).is_empty());
}
