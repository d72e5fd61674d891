//! Full-fidelity syntax tree.
//!
//! Every grammar slot that may be missing from malformed input is an
//! `Option`, so error productions still hand back a usable node. A node's
//! span is the union of the spans of whatever it holds; a node holding no
//! tokens at all has no span.

use std::fmt;

use crate::text::Span;
use crate::token::{Token, TokenKind};

/// Discriminant of [`SyntaxNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    Single,
    Sequence,
    PartialSymbol,
    CompoundSymbol,
    NamespacedSymbol,
    InterpolatedSymbol,
    Attribute,
    Element,
    ClosingTag,
    Comment,
    Content,
    Trivia,
    Document,
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Any syntax node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxNode {
    Single(SingleSyntax),
    Sequence(SequenceSyntax),
    PartialSymbol(PartialSymbolSyntax),
    CompoundSymbol(CompoundSymbolSyntax),
    NamespacedSymbol(NamespacedSymbolSyntax),
    InterpolatedSymbol(InterpolatedSymbolSyntax),
    Attribute(AttributeSyntax),
    Element(ElementSyntax),
    ClosingTag(ClosingTagSyntax),
    Comment(CommentSyntax),
    Content(ContentSyntax),
    Trivia(TriviaSyntax),
    Document(DocumentSyntax),
}

impl SyntaxNode {
    #[must_use]
    pub const fn kind(&self) -> SyntaxKind {
        match self {
            Self::Single(_) => SyntaxKind::Single,
            Self::Sequence(_) => SyntaxKind::Sequence,
            Self::PartialSymbol(_) => SyntaxKind::PartialSymbol,
            Self::CompoundSymbol(_) => SyntaxKind::CompoundSymbol,
            Self::NamespacedSymbol(_) => SyntaxKind::NamespacedSymbol,
            Self::InterpolatedSymbol(_) => SyntaxKind::InterpolatedSymbol,
            Self::Attribute(_) => SyntaxKind::Attribute,
            Self::Element(_) => SyntaxKind::Element,
            Self::ClosingTag(_) => SyntaxKind::ClosingTag,
            Self::Comment(_) => SyntaxKind::Comment,
            Self::Content(_) => SyntaxKind::Content,
            Self::Trivia(_) => SyntaxKind::Trivia,
            Self::Document(_) => SyntaxKind::Document,
        }
    }

    #[must_use]
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Single(node) => node.span(),
            Self::Sequence(node) => node.span(),
            Self::PartialSymbol(node) => node.span(),
            Self::CompoundSymbol(node) => node.span(),
            Self::NamespacedSymbol(node) => node.span(),
            Self::InterpolatedSymbol(node) => node.span(),
            Self::Attribute(node) => node.span(),
            Self::Element(node) => node.span(),
            Self::ClosingTag(node) => node.span(),
            Self::Comment(node) => node.span(),
            Self::Content(node) => node.span(),
            Self::Trivia(node) => node.span(),
            Self::Document(node) => node.span(),
        }
    }
}

fn tokens_span(tokens: &[Token]) -> Option<Span> {
    Span::cover(tokens.iter().map(|token| token.span))
}

fn nodes_span(nodes: &[SyntaxNode]) -> Option<Span> {
    Span::cover(nodes.iter().filter_map(SyntaxNode::span))
}

/// One or more raw tokens consumed together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleSyntax {
    pub tokens: Vec<Token>,
}

impl SingleSyntax {
    #[must_use]
    pub fn span(&self) -> Option<Span> {
        tokens_span(&self.tokens)
    }

    /// Kind of the first token.
    #[must_use]
    pub fn first_kind(&self) -> Option<TokenKind> {
        self.tokens.first().map(|token| token.kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceSyntax {
    pub nodes: Vec<SyntaxNode>,
}

impl SequenceSyntax {
    #[must_use]
    pub fn span(&self) -> Option<Span> {
        nodes_span(&self.nodes)
    }
}

/// `Alpha (Alpha | Numeric | '-' (Alpha | Numeric))*`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialSymbolSyntax {
    pub tokens: Vec<Token>,
}

impl PartialSymbolSyntax {
    #[must_use]
    pub fn span(&self) -> Option<Span> {
        tokens_span(&self.tokens)
    }
}

/// Partial symbols joined by `.`; holds the partials and the delimiters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundSymbolSyntax {
    pub nodes: Vec<SyntaxNode>,
}

impl CompoundSymbolSyntax {
    #[must_use]
    pub fn span(&self) -> Option<Span> {
        nodes_span(&self.nodes)
    }
}

/// Compound symbols joined by `/`; holds the compounds and the delimiters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespacedSymbolSyntax {
    pub nodes: Vec<SyntaxNode>,
}

impl NamespacedSymbolSyntax {
    #[must_use]
    pub fn span(&self) -> Option<Span> {
        nodes_span(&self.nodes)
    }
}

/// `@{ namespace/key }@`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpolatedSymbolSyntax {
    pub open: SingleSyntax,
    pub symbol: Option<NamespacedSymbolSyntax>,
    pub close: Option<SingleSyntax>,
}

impl InterpolatedSymbolSyntax {
    #[must_use]
    pub fn span(&self) -> Option<Span> {
        Span::cover(
            [
                self.open.span(),
                self.symbol.as_ref().and_then(NamespacedSymbolSyntax::span),
                self.close.as_ref().and_then(SingleSyntax::span),
            ]
            .into_iter()
            .flatten(),
        )
    }

    #[must_use]
    pub const fn is_terminated(&self) -> bool {
        self.symbol.is_some() && self.close.is_some()
    }
}

/// Raw tokens interleaved with interpolations: [`SyntaxNode::Single`] and
/// [`SyntaxNode::InterpolatedSymbol`] only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentSyntax {
    pub nodes: Vec<SyntaxNode>,
}

impl ContentSyntax {
    #[must_use]
    pub fn span(&self) -> Option<Span> {
        nodes_span(&self.nodes)
    }
}

/// `name="value"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSyntax {
    pub name: PartialSymbolSyntax,
    pub equal: Option<SingleSyntax>,
    pub open_quote: Option<SingleSyntax>,
    pub contents: Option<ContentSyntax>,
    pub close_quote: Option<SingleSyntax>,
}

impl AttributeSyntax {
    #[must_use]
    pub fn span(&self) -> Option<Span> {
        Span::cover(
            [
                self.name.span(),
                self.equal.as_ref().and_then(SingleSyntax::span),
                self.open_quote.as_ref().and_then(SingleSyntax::span),
                self.contents.as_ref().and_then(ContentSyntax::span),
                self.close_quote.as_ref().and_then(SingleSyntax::span),
            ]
            .into_iter()
            .flatten(),
        )
    }

    /// Both quotes are present.
    #[must_use]
    pub const fn is_terminated(&self) -> bool {
        self.open_quote.is_some() && self.close_quote.is_some()
    }
}

/// `</ name >`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosingTagSyntax {
    pub open: SingleSyntax,
    pub name: Option<SingleSyntax>,
    pub close: Option<SingleSyntax>,
}

impl ClosingTagSyntax {
    #[must_use]
    pub fn span(&self) -> Option<Span> {
        Span::cover(
            [
                self.open.span(),
                self.name.as_ref().and_then(SingleSyntax::span),
                self.close.as_ref().and_then(SingleSyntax::span),
            ]
            .into_iter()
            .flatten(),
        )
    }
}

/// `<!-- ... -->`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentSyntax {
    pub open: SingleSyntax,
    pub contents: Option<SequenceSyntax>,
    pub close: Option<SingleSyntax>,
}

impl CommentSyntax {
    #[must_use]
    pub fn span(&self) -> Option<Span> {
        Span::cover(
            [
                self.open.span(),
                self.contents.as_ref().and_then(SequenceSyntax::span),
                self.close.as_ref().and_then(SingleSyntax::span),
            ]
            .into_iter()
            .flatten(),
        )
    }
}

/// Whitespace runs ([`SyntaxNode::Single`]) and comments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriviaSyntax {
    pub nodes: Vec<SyntaxNode>,
}

impl TriviaSyntax {
    #[must_use]
    pub fn span(&self) -> Option<Span> {
        nodes_span(&self.nodes)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// `<name attr="..."/>` or `<name attr="...">children</name>`.
///
/// `children` holds either element nodes or a single content node, never
/// both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementSyntax {
    pub leading_trivia: TriviaSyntax,
    pub open_bracket: Option<SingleSyntax>,
    pub name: Option<SingleSyntax>,
    pub attributes: Vec<AttributeSyntax>,
    /// `>` or `/>`.
    pub open_tag_end: Option<SingleSyntax>,
    pub children: Vec<SyntaxNode>,
    pub closing_tag: Option<ClosingTagSyntax>,
}

/// How much of an element's tag structure parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementForm<'a> {
    /// `<name .../>`
    SelfClosing { name: &'a SingleSyntax },
    /// `<name ...> ... </closing_name>`
    Paired {
        name: &'a SingleSyntax,
        closing_name: &'a SingleSyntax,
    },
    /// Only leading trivia; no tag was opened.
    TriviaOnly,
    /// A tag was opened but its name, its end, or its closing tag is missing.
    Incomplete,
}

impl ElementSyntax {
    #[must_use]
    pub fn span(&self) -> Option<Span> {
        Span::cover(
            [
                self.leading_trivia.span(),
                self.open_bracket.as_ref().and_then(SingleSyntax::span),
                self.name.as_ref().and_then(SingleSyntax::span),
                Span::cover(self.attributes.iter().filter_map(AttributeSyntax::span)),
                self.open_tag_end.as_ref().and_then(SingleSyntax::span),
                nodes_span(&self.children),
                self.closing_tag.as_ref().and_then(ClosingTagSyntax::span),
            ]
            .into_iter()
            .flatten(),
        )
    }

    #[must_use]
    pub const fn is_trivia_only(&self) -> bool {
        self.open_bracket.is_none()
    }

    #[must_use]
    pub fn form(&self) -> ElementForm<'_> {
        if self.open_bracket.is_none() {
            return ElementForm::TriviaOnly;
        }

        let (Some(name), Some(end)) = (&self.name, &self.open_tag_end) else {
            return ElementForm::Incomplete;
        };

        if end.first_kind() == Some(TokenKind::SlashCloseBracket) {
            return ElementForm::SelfClosing { name };
        }

        match self.closing_tag.as_ref().and_then(|tag| tag.name.as_ref()) {
            Some(closing_name) => ElementForm::Paired { name, closing_name },
            None => ElementForm::Incomplete,
        }
    }
}

/// Root element plus trailing trivia.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSyntax {
    pub root: ElementSyntax,
    pub trailing_trivia: TriviaSyntax,
}

impl DocumentSyntax {
    #[must_use]
    pub fn span(&self) -> Option<Span> {
        Span::cover(
            [self.root.span(), self.trailing_trivia.span()]
                .into_iter()
                .flatten(),
        )
    }
}
