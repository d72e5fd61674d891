//! Speculative cursor shared by the lexer and the parser.
//!
//! A cursor tracks a committed `position` and a lookahead `offset`; the
//! window `position ..= position + offset` is the candidate slice. Rules
//! extend the window with [`Cursor::shift_right`] while scanning and turn it
//! into a value with [`Cursor::consume`], which also commits past it. Nothing
//! is copied while scanning, so abandoning a scan is just
//! [`Cursor::reset_offset`].

use crate::text::{SourceText, Span};
use crate::token::{Token, TokenStream};

/// Backing storage a [`Cursor`] reads from.
pub trait Window {
    /// Element returned by lookahead.
    type Item;
    /// Value produced when a window is consumed.
    type Slice;

    /// Element at `index`. Must not fail for indices past the end.
    fn get(&self, index: usize) -> Self::Item;

    /// Value covering `start ..= end`.
    fn build(&self, start: usize, end: usize) -> Self::Slice;
}

#[derive(Debug, Clone)]
pub struct Cursor<W> {
    window: W,
    position: usize,
    offset: usize,
}

impl<W: Window> Cursor<W> {
    pub const fn new(window: W) -> Self {
        Self {
            window,
            position: 0,
            offset: 0,
        }
    }

    pub const fn window(&self) -> &W {
        &self.window
    }

    /// Index of the first uncommitted element.
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Index of the last element in the lookahead window.
    pub const fn head(&self) -> usize {
        self.position + self.offset
    }

    pub const fn is_offset(&self) -> bool {
        self.offset > 0
    }

    /// Element `k` places past the head, without committing.
    pub fn peek(&self, k: usize) -> W::Item {
        self.window.get(self.head() + k)
    }

    pub fn current(&self) -> W::Item {
        self.peek(0)
    }

    /// Grow the lookahead window.
    pub const fn shift_right(&mut self, delta: usize) {
        self.offset += delta;
    }

    /// Shrink the lookahead window. Returns `false` (and clamps to an empty
    /// window) when asked to shrink past the committed position.
    pub const fn shift_left(&mut self, delta: usize) -> bool {
        if delta > self.offset {
            self.offset = 0;
            return false;
        }
        self.offset -= delta;
        true
    }

    /// Extend the window by `delta`, build it, and commit past it.
    pub fn consume(&mut self, delta: usize) -> W::Slice {
        self.shift_right(delta);

        let start = self.position;
        let end = self.head();
        self.position = end + 1;
        self.offset = 0;

        self.window.build(start, end)
    }

    pub const fn reset_window(&mut self, position: usize) {
        self.position = position;
        self.offset = 0;
    }

    pub const fn reset_offset(&mut self) {
        self.offset = 0;
    }
}

/// Characters of a consumed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lexeme {
    pub offset: usize,
    pub len: usize,
    pub span: Span,
}

/// Character access over normalized text. Reads past the end yield `'\0'`.
#[derive(Debug, Clone, Copy)]
pub struct CharWindow<'a> {
    text: &'a SourceText,
}

impl<'a> CharWindow<'a> {
    pub const fn new(text: &'a SourceText) -> Self {
        Self { text }
    }
}

impl Window for CharWindow<'_> {
    type Item = char;
    type Slice = Lexeme;

    fn get(&self, index: usize) -> char {
        self.text.char_at(index).unwrap_or('\0')
    }

    fn build(&self, start: usize, end: usize) -> Lexeme {
        Lexeme {
            offset: start,
            len: end - start + 1,
            span: Span::between(
                self.text.id(),
                self.text.locate(start),
                self.text.locate(end),
            ),
        }
    }
}

/// Token access over a lexed stream. Reads past the end yield the final
/// EOF token.
#[derive(Debug, Clone, Copy)]
pub struct TokenWindow<'a> {
    tokens: &'a [Token],
}

impl<'a> TokenWindow<'a> {
    pub fn new(stream: &'a TokenStream) -> Self {
        Self {
            tokens: stream.as_slice(),
        }
    }

    /// The EOF token terminating the stream.
    pub fn last(&self) -> &'a Token {
        &self.tokens[self.tokens.len() - 1]
    }

    fn clamp(&self, index: usize) -> usize {
        index.min(self.tokens.len() - 1)
    }
}

impl<'a> Window for TokenWindow<'a> {
    type Item = &'a Token;
    type Slice = &'a [Token];

    fn get(&self, index: usize) -> &'a Token {
        &self.tokens[self.clamp(index)]
    }

    fn build(&self, start: usize, end: usize) -> &'a [Token] {
        &self.tokens[self.clamp(start)..=self.clamp(end)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::token::TokenKind;

    #[test]
    fn peek_does_not_commit() {
        let text = SourceText::new("hello");
        let mut cursor = Cursor::new(CharWindow::new(&text));
        assert_eq!(cursor.peek(1), 'e');
        assert_eq!(cursor.current(), 'h');
        cursor.shift_right(2);
        assert_eq!(cursor.current(), 'l');
        assert_eq!(cursor.position(), 0);
        assert!(cursor.is_offset());
    }

    #[test]
    fn consume_commits_past_window() {
        let text = SourceText::new("hello");
        let mut cursor = Cursor::new(CharWindow::new(&text));
        let lexeme = cursor.consume(1);
        assert_eq!(text.slice(lexeme.offset, lexeme.len), "he");
        assert_eq!(cursor.position(), 2);
        assert_eq!(cursor.current(), 'l');
        assert!(!cursor.is_offset());
    }

    #[test]
    fn shift_left_clamps_at_zero() {
        let text = SourceText::new("hello");
        let mut cursor = Cursor::new(CharWindow::new(&text));
        cursor.shift_right(2);
        assert!(cursor.shift_left(1));
        assert_eq!(cursor.head(), 1);
        assert!(!cursor.shift_left(5));
        assert_eq!(cursor.head(), 0);
    }

    #[test]
    fn chars_past_end_are_nul() {
        let text = SourceText::new("hello");
        let cursor = Cursor::new(CharWindow::new(&text));
        assert_eq!(cursor.peek(5), '\0');
        assert_eq!(cursor.peek(500), '\0');
    }

    #[test]
    fn char_lexeme_spans_its_line() {
        let text = SourceText::new("hello\nworld");
        let mut cursor = Cursor::new(CharWindow::new(&text));
        cursor.reset_window(3);
        let lexeme = cursor.consume(2);
        assert_eq!(text.slice(lexeme.offset, lexeme.len), "lo\n");
        assert_eq!(lexeme.span.start(), (0, 3));
        assert_eq!(lexeme.span.end(), (0, 5));
    }

    #[test]
    fn tokens_past_end_clamp_to_eof() {
        let text = SourceText::new("ab");
        let stream = tokenize(&text);
        let mut cursor = Cursor::new(TokenWindow::new(&stream));
        assert_eq!(cursor.peek(10).kind, TokenKind::Eof);
        cursor.reset_window(50);
        assert_eq!(cursor.current().kind, TokenKind::Eof);
        assert_eq!(cursor.consume(3).len(), 1);
    }
}
