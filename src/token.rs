use std::fmt;

use crate::text::Span;

/// Token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Zero-width end of input.
    Eof,
    /// `</`
    OpenBracketSlash,
    /// `<!`
    OpenBracketBang,
    /// `<`
    OpenBracket,
    /// `/>`
    SlashCloseBracket,
    /// `/`
    Slash,
    /// `>`
    CloseBracket,
    /// `.`
    Period,
    /// `,`
    Comma,
    /// `=`
    Equal,
    /// `"`
    Quote,
    /// `@{`
    AtOpenBrace,
    /// `}@`
    CloseBraceAt,
    /// `@`
    At,
    /// `--`
    HyphenHyphen,
    /// `-`
    Hyphen,
    /// Any other ASCII punctuation.
    SpecialChar,
    /// Line terminator.
    NewLine,
    /// Run of letters.
    Alpha,
    /// Run of digits.
    Numeric,
    /// Run of non-newline whitespace.
    Whitespace,
    /// Character no other kind accepts.
    Unknown,
}

impl TokenKind {
    /// Whitespace or a line terminator.
    #[must_use]
    pub const fn is_whitespace(self) -> bool {
        matches!(self, Self::Whitespace | Self::NewLine)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Eof => "end of input",
            Self::OpenBracketSlash => "'</'",
            Self::OpenBracketBang => "'<!'",
            Self::OpenBracket => "'<'",
            Self::SlashCloseBracket => "'/>'",
            Self::Slash => "'/'",
            Self::CloseBracket => "'>'",
            Self::Period => "'.'",
            Self::Comma => "','",
            Self::Equal => "'='",
            Self::Quote => "'\"'",
            Self::AtOpenBrace => "'@{'",
            Self::CloseBraceAt => "'}@'",
            Self::At => "'@'",
            Self::HyphenHyphen => "'--'",
            Self::Hyphen => "'-'",
            Self::SpecialChar => "special character",
            Self::NewLine => "newline",
            Self::Alpha => "letters",
            Self::Numeric => "digits",
            Self::Whitespace => "whitespace",
            Self::Unknown => "unknown character",
        };
        f.write_str(text)
    }
}

/// A single token: its kind, where it sits, and which characters of the
/// normalized text it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// Absolute character offset of the first character.
    pub offset: usize,
    /// Length in characters; zero only for [`TokenKind::Eof`].
    pub len: usize,
}

/// Lexer output. Never empty: the last token is always the single EOF token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    pub(crate) fn new(tokens: Vec<Token>) -> Self {
        debug_assert!(
            tokens.last().is_some_and(|t| t.kind == TokenKind::Eof),
            "token stream must end with EOF"
        );
        Self { tokens }
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Always `false`; present for symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}
