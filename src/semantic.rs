//! Editor highlighting over the syntax tree.
//!
//! Walks syntax rather than the bound tree, so partial and malformed input
//! is still classified. Every emitted token lies on a single line: spans
//! that cross lines are split ("exploded") into one token per line.

use tracing::debug;

use crate::syntax::{
    AttributeSyntax, DocumentSyntax, ElementSyntax, InterpolatedSymbolSyntax, SingleSyntax,
    SyntaxNode,
};
use crate::text::{SourceText, Span};

/// Highlighting categories. Discriminants are legend indices and must not
/// be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum SemanticTokenKind {
    Comment = 0,
    Element = 1,
    Variable = 2,
    Attribute = 3,
    String = 4,
    InterpolatedBlock = 5,
}

impl SemanticTokenKind {
    pub const ALL: [Self; 6] = [
        Self::Comment,
        Self::Element,
        Self::Variable,
        Self::Attribute,
        Self::String,
        Self::InterpolatedBlock,
    ];

    /// Token type names, in index order.
    pub const LEGEND: [&'static str; 6] = [
        "comment",
        "element",
        "variableValue",
        "attribute",
        "string",
        "variableInterpolation",
    ];

    #[must_use]
    pub const fn index(self) -> u32 {
        self as u32
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        Self::LEGEND[self as usize]
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

/// One classified run of characters on a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SemanticToken {
    pub kind: SemanticTokenKind,
    pub line: usize,
    pub start: usize,
    pub length: usize,
}

impl SemanticToken {
    /// Column of the last character covered.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.start + self.length.saturating_sub(1)
    }
}

/// Classify a whole document.
#[must_use]
pub fn document_tokens(text: &SourceText, document: &DocumentSyntax) -> Vec<SemanticToken> {
    let mut classifier = Classifier::new(text);
    classifier.document(document);
    debug!(tokens = classifier.tokens.len(), "classified document");
    classifier.tokens
}

/// Classify any syntax node.
#[must_use]
pub fn semantic_tokens(text: &SourceText, node: &SyntaxNode) -> Vec<SemanticToken> {
    let mut classifier = Classifier::new(text);
    classifier.node(node);
    classifier.tokens
}

/// LSP wire form: five integers per token (`deltaLine`, `deltaStart`,
/// `length`, `tokenType`, `tokenModifiers`), each position relative to the
/// previous token. Modifiers are always zero.
#[must_use]
pub fn encode_relative(tokens: &[SemanticToken]) -> Vec<u32> {
    let mut data = Vec::with_capacity(tokens.len() * 5);
    let mut prev_line = 0;
    let mut prev_start = 0;

    for token in tokens {
        let delta_line = token.line.saturating_sub(prev_line);
        let delta_start = if delta_line > 0 {
            token.start
        } else {
            token.start.saturating_sub(prev_start)
        };
        prev_line = token.line;
        prev_start = token.start;

        data.extend([
            to_u32(delta_line),
            to_u32(delta_start),
            to_u32(token.length),
            token.kind.index(),
            0,
        ]);
    }

    data
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

struct Classifier<'a> {
    text: &'a SourceText,
    tokens: Vec<SemanticToken>,
}

impl<'a> Classifier<'a> {
    const fn new(text: &'a SourceText) -> Self {
        Self {
            text,
            tokens: Vec::new(),
        }
    }

    fn node(&mut self, node: &SyntaxNode) {
        match node {
            SyntaxNode::Comment(comment) => {
                self.explode(comment.span(), SemanticTokenKind::Comment);
            }
            SyntaxNode::ClosingTag(tag) => self.explode(tag.span(), SemanticTokenKind::Element),
            SyntaxNode::NamespacedSymbol(symbol) => {
                self.explode(symbol.span(), SemanticTokenKind::Variable);
            }
            SyntaxNode::InterpolatedSymbol(interpolated) => self.interpolated(interpolated),
            SyntaxNode::Attribute(attribute) => self.attribute(attribute),
            SyntaxNode::Element(element) => self.element(element),
            SyntaxNode::Document(document) => self.document(document),
            SyntaxNode::Sequence(sequence) => self.nodes(&sequence.nodes),
            SyntaxNode::CompoundSymbol(compound) => self.nodes(&compound.nodes),
            SyntaxNode::Content(content) => self.nodes(&content.nodes),
            SyntaxNode::Trivia(trivia) => self.nodes(&trivia.nodes),
            SyntaxNode::Single(_) | SyntaxNode::PartialSymbol(_) => {}
        }
    }

    fn nodes(&mut self, nodes: &[SyntaxNode]) {
        for node in nodes {
            self.node(node);
        }
    }

    fn document(&mut self, document: &DocumentSyntax) {
        self.element(&document.root);
        self.nodes(&document.trailing_trivia.nodes);
    }

    fn element(&mut self, element: &ElementSyntax) {
        self.nodes(&element.leading_trivia.nodes);
        self.single(element.open_bracket.as_ref(), SemanticTokenKind::Element);
        self.single(element.name.as_ref(), SemanticTokenKind::Element);
        for attribute in &element.attributes {
            self.attribute(attribute);
        }
        self.single(element.open_tag_end.as_ref(), SemanticTokenKind::Element);
        self.nodes(&element.children);
        if let Some(tag) = &element.closing_tag {
            self.explode(tag.span(), SemanticTokenKind::Element);
        }
    }

    fn interpolated(&mut self, interpolated: &InterpolatedSymbolSyntax) {
        self.explode(interpolated.open.span(), SemanticTokenKind::InterpolatedBlock);
        if let Some(symbol) = &interpolated.symbol {
            self.explode(symbol.span(), SemanticTokenKind::Variable);
        }
        self.single(interpolated.close.as_ref(), SemanticTokenKind::InterpolatedBlock);
    }

    /// The name, then the quoted value as string runs broken around each
    /// interpolation. Quotes join the string run next to them.
    fn attribute(&mut self, attribute: &AttributeSyntax) {
        self.explode(attribute.name.span(), SemanticTokenKind::Attribute);

        let Some(open_quote) = &attribute.open_quote else {
            return;
        };

        let mut run = open_quote.span();
        let contents = attribute.contents.as_ref().map_or(&[][..], |c| c.nodes.as_slice());
        for child in contents {
            if let SyntaxNode::InterpolatedSymbol(interpolated) = child {
                if let Some(span) = run.take() {
                    self.explode(Some(span), SemanticTokenKind::String);
                }
                self.interpolated(interpolated);
            } else {
                run = Span::cover(run.into_iter().chain(child.span()));
            }
        }

        if let Some(close_quote) = &attribute.close_quote {
            run = Span::cover(run.into_iter().chain(close_quote.span()));
        }
        self.explode(run, SemanticTokenKind::String);
    }

    fn single(&mut self, single: Option<&SingleSyntax>, kind: SemanticTokenKind) {
        self.explode(single.and_then(SingleSyntax::span), kind);
    }

    /// Emit one token per line of `span`. The first line runs from the
    /// start column to the end of the line, middle lines are whole, and
    /// the last line stops at the end column.
    fn explode(&mut self, span: Option<Span>, kind: SemanticTokenKind) {
        let Some(span) = span else {
            return;
        };

        if span.is_single_line() {
            self.push(kind, span.start_line(), span.start_col(), span.end_col());
            return;
        }

        for line in span.start_line()..=span.end_line() {
            let start = if line == span.start_line() {
                span.start_col()
            } else {
                0
            };
            let end = if line == span.end_line() {
                span.end_col()
            } else {
                self.text.line_len(line).unwrap_or(0).saturating_sub(1)
            };
            self.push(kind, line, start, end);
        }
    }

    fn push(&mut self, kind: SemanticTokenKind, line: usize, start: usize, end: usize) {
        self.tokens.push(SemanticToken {
            kind,
            line,
            start,
            length: end.saturating_sub(start) + 1,
        });
    }
}
