use tracing::debug;

use crate::cursor::{CharWindow, Cursor};
use crate::text::{SourceText, Span};
use crate::token::{Token, TokenKind, TokenStream};

/// Tokenize normalized source text.
///
/// Never fails: characters no rule accepts become
/// [`TokenKind::Unknown`] tokens and are left for the parser to diagnose.
/// The stream always ends with exactly one zero-width EOF token placed
/// after the last character of the last line.
#[must_use]
pub fn tokenize(text: &SourceText) -> TokenStream {
    Lexer::new(text).tokenize()
}

struct Lexer<'a> {
    text: &'a SourceText,
    cursor: Cursor<CharWindow<'a>>,
}

impl<'a> Lexer<'a> {
    const fn new(text: &'a SourceText) -> Self {
        Self {
            text,
            cursor: Cursor::new(CharWindow::new(text)),
        }
    }

    fn tokenize(mut self) -> TokenStream {
        let mut tokens = Vec::new();

        while self.cursor.position() < self.text.len() {
            tokens.push(self.next_token());
        }
        tokens.push(self.eof_token());

        debug!(tokens = tokens.len(), "lexed document");
        TokenStream::new(tokens)
    }

    fn next_token(&mut self) -> Token {
        let ch = self.cursor.current();
        let next = self.cursor.peek(1);

        match ch {
            '<' if next == '/' => self.make_token(TokenKind::OpenBracketSlash, 2),
            '<' if next == '!' => self.make_token(TokenKind::OpenBracketBang, 2),
            '<' => self.make_token(TokenKind::OpenBracket, 1),
            '/' if next == '>' => self.make_token(TokenKind::SlashCloseBracket, 2),
            '/' => self.make_token(TokenKind::Slash, 1),
            '>' => self.make_token(TokenKind::CloseBracket, 1),
            '.' => self.make_token(TokenKind::Period, 1),
            ',' => self.make_token(TokenKind::Comma, 1),
            '=' => self.make_token(TokenKind::Equal, 1),
            '"' => self.make_token(TokenKind::Quote, 1),
            '@' if next == '{' => self.make_token(TokenKind::AtOpenBrace, 2),
            '@' => self.make_token(TokenKind::At, 1),
            '}' if next == '@' => self.make_token(TokenKind::CloseBraceAt, 2),
            '-' if next == '-' => self.make_token(TokenKind::HyphenHyphen, 2),
            '-' => self.make_token(TokenKind::Hyphen, 1),
            '\n' => self.make_token(TokenKind::NewLine, 1),
            '}' | '{' | '!' | '#' | '$' | '%' | '^' | '&' | '*' | '(' | ')' | '_' | '+' | '~'
            | '`' | '[' | ']' | '|' | ':' | ';' | '?' | '\\' | '\'' => {
                self.make_token(TokenKind::SpecialChar, 1)
            }
            _ => self.read_run(ch),
        }
    }

    /// Maximal-munch run of one character class.
    fn read_run(&mut self, first: char) -> Token {
        let (kind, include): (TokenKind, fn(char) -> bool) = if first.is_alphabetic() {
            (TokenKind::Alpha, char::is_alphabetic)
        } else if is_inline_whitespace(first) {
            (TokenKind::Whitespace, is_inline_whitespace)
        } else if first.is_numeric() {
            (TokenKind::Numeric, char::is_numeric)
        } else {
            return self.make_token(TokenKind::Unknown, 1);
        };

        while include(self.cursor.peek(1)) {
            self.cursor.shift_right(1);
        }
        self.make_token(kind, 1)
    }

    fn make_token(&mut self, kind: TokenKind, width: usize) -> Token {
        let lexeme = self.cursor.consume(width - 1);
        Token {
            kind,
            span: lexeme.span,
            offset: lexeme.offset,
            len: lexeme.len,
        }
    }

    fn eof_token(&self) -> Token {
        let line = self.text.line_count().saturating_sub(1);
        let col = self.text.line_len(line).unwrap_or(0);
        Token {
            kind: TokenKind::Eof,
            span: Span::point(self.text.id(), line, col),
            offset: self.text.len(),
            len: 0,
        }
    }
}

fn is_inline_whitespace(ch: char) -> bool {
    ch != '\n' && ch.is_whitespace()
}
