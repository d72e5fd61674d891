//! Lexer edge cases and text normalization tests.

use foreman_analysis::{SourceText, TokenKind, tokenize};

fn kinds(input: &str) -> Vec<TokenKind> {
    let text = SourceText::new(input);
    tokenize(&text).iter().map(|t| t.kind).collect()
}

fn lexemes(input: &str) -> Vec<String> {
    let text = SourceText::new(input);
    tokenize(&text)
        .iter()
        .map(|t| text.slice(t.offset, t.len))
        .collect()
}

// -----------------------------------------------------------
// Basic lexer behaviour.
// -----------------------------------------------------------

#[test]
fn lex_empty_input() {
    assert_eq!(kinds(""), vec![TokenKind::Eof]);
}

#[test]
fn lex_only_whitespace() {
    let found = kinds("   \t  \n\n  ");
    assert!(
        found[..found.len() - 1]
            .iter()
            .all(|kind| kind.is_whitespace())
    );
    assert_eq!(found.last(), Some(&TokenKind::Eof));
}

#[test]
fn lex_self_closing_element() {
    assert_eq!(
        kinds("<job/>"),
        vec![
            TokenKind::OpenBracket,
            TokenKind::Alpha,
            TokenKind::SlashCloseBracket,
            TokenKind::Eof
        ]
    );
}

#[test]
fn lex_attribute_with_interpolation() {
    assert_eq!(
        lexemes("cmd=\"@{env/name}@\""),
        vec!["cmd", "=", "\"", "@{", "env", "/", "name", "}@", "\"", ""]
    );
}

#[test]
fn lex_comment_delimiters() {
    assert_eq!(
        kinds("<!-- x -->"),
        vec![
            TokenKind::OpenBracketBang,
            TokenKind::HyphenHyphen,
            TokenKind::Whitespace,
            TokenKind::Alpha,
            TokenKind::Whitespace,
            TokenKind::HyphenHyphen,
            TokenKind::CloseBracket,
            TokenKind::Eof
        ]
    );
}

#[test]
fn lex_three_hyphens() {
    assert_eq!(
        kinds("---"),
        vec![TokenKind::HyphenHyphen, TokenKind::Hyphen, TokenKind::Eof]
    );
}

#[test]
fn lex_lone_at_and_brace() {
    assert_eq!(
        kinds("@ {"),
        vec![
            TokenKind::At,
            TokenKind::Whitespace,
            TokenKind::SpecialChar,
            TokenKind::Eof
        ]
    );
}

#[test]
fn lex_special_characters() {
    for input in [
        "!", "#", "$", "%", "^", "&", "*", "(", ")", "_", "+", "~", "`", "[", "]", "|", ":", ";",
        "?", "\\", "'", "{", "}",
    ] {
        assert_eq!(
            kinds(input),
            vec![TokenKind::SpecialChar, TokenKind::Eof],
            "lexing {input:?}"
        );
    }
}

#[test]
fn lex_unicode_letters_and_digits() {
    assert_eq!(kinds("héllo"), vec![TokenKind::Alpha, TokenKind::Eof]);
    assert_eq!(kinds("٣٤"), vec![TokenKind::Numeric, TokenKind::Eof]);
}

#[test]
fn lex_unknown_characters_one_at_a_time() {
    assert_eq!(
        kinds("€€"),
        vec![TokenKind::Unknown, TokenKind::Unknown, TokenKind::Eof]
    );
}

// -----------------------------------------------------------
// Positions.
// -----------------------------------------------------------

#[test]
fn lex_token_spans_are_inclusive() {
    let text = SourceText::new("<hello>");
    let stream = tokenize(&text);
    let name = stream.as_slice()[1];
    assert_eq!(name.span.start(), (0, 1));
    assert_eq!(name.span.end(), (0, 5));
    assert_eq!(name.offset, 1);
    assert_eq!(name.len, 5);
}

#[test]
fn lex_newline_ends_its_line() {
    let text = SourceText::new("a\nb");
    let stream = tokenize(&text);
    let newline = stream.as_slice()[1];
    assert_eq!(newline.kind, TokenKind::NewLine);
    assert_eq!(newline.span.start(), (0, 1));
    assert_eq!(stream.as_slice()[2].span.start(), (1, 0));
}

#[test]
fn lex_exactly_one_eof() {
    for input in ["", "a", "<a/>\n", "\n\n", "<!-- x"] {
        let text = SourceText::new(input);
        let stream = tokenize(&text);
        let eofs = stream.iter().filter(|t| t.kind == TokenKind::Eof).count();
        assert_eq!(eofs, 1, "{input:?}");
        assert_eq!(stream.as_slice()[stream.len() - 1].kind, TokenKind::Eof);
    }
}

// -----------------------------------------------------------
// Normalization.
// -----------------------------------------------------------

#[test]
fn lex_line_endings_are_normalized() {
    for input in ["a\r\nb", "a\rb", "a\nb"] {
        let text = SourceText::new(input);
        assert_eq!(text.contents(), "a\nb", "{input:?}");
        assert_eq!(
            kinds(input),
            vec![
                TokenKind::Alpha,
                TokenKind::NewLine,
                TokenKind::Alpha,
                TokenKind::Eof
            ]
        );
    }
}

#[test]
fn lex_tokens_reproduce_text() {
    let input = "<job>\r\n  <step cmd=\"run @{a/b}@\"/><!-- € -->\r</job>";
    let text = SourceText::new(input);
    let joined: String = tokenize(&text)
        .iter()
        .map(|t| text.slice(t.offset, t.len))
        .collect();
    assert_eq!(joined, text.contents());
}
