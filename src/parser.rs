use tracing::{debug, trace};

use crate::cursor::{Cursor, TokenWindow};
use crate::diagnostic::Diagnostic;
use crate::syntax::{
    AttributeSyntax, ClosingTagSyntax, CommentSyntax, CompoundSymbolSyntax, ContentSyntax,
    DocumentSyntax, ElementSyntax, InterpolatedSymbolSyntax, NamespacedSymbolSyntax,
    PartialSymbolSyntax, SequenceSyntax, SingleSyntax, SyntaxNode, TriviaSyntax,
};
use crate::text::Span;
use crate::token::{Token, TokenKind, TokenStream};

/// Problems the parser reports. Each case renders to the diagnostic
/// message recorded for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParseDiagnostic {
    #[error(
        "Incomplete CompoundSymbol. Symbol fragments must be conjoined by '.' characters without ending in one."
    )]
    IncompleteCompoundSymbol,
    #[error(
        "Incomplete NamespacedSymbol. Symbol clauses must be conjoined by '/' characters without ending in one."
    )]
    IncompleteNamespacedSymbol,
    #[error("Declared symbol does not have any namespaces declared.")]
    MissingNamespace,
    #[error("Non-terminated interpolation.")]
    NonTerminatedInterpolation,
    #[error("Missing attribute assignment.")]
    MissingAttributeAssignment,
    #[error("Non-terminated string.")]
    NonTerminatedString,
    #[error("Incomplete XmlCloseTag. Expected the whitespace agnostic pattern </AAA>.")]
    IncompleteXmlCloseTag,
    #[error("Non-terminated comment.")]
    NonTerminatedComment,
    #[error("Element is missing name.")]
    MissingElementName,
    #[error("Non-terminated element tag.")]
    NonTerminatedElementTag,
    #[error("Invalid element name.")]
    InvalidElementName,
    #[error("Missing spacing between attributes.")]
    MissingAttributeSpacing,
    #[error("Non-terminated xml document.")]
    NonTerminatedXmlDocument,
    #[error("Invalid element value")]
    InvalidElementValue,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Element nesting exceeds the maximum depth.")]
    NestingTooDeep,
}

const WHITESPACE: [TokenKind; 2] = [TokenKind::Whitespace, TokenKind::NewLine];
const OPEN_TAG_END: [TokenKind; 2] = [TokenKind::CloseBracket, TokenKind::SlashCloseBracket];
const COMMENT_OPEN: [TokenKind; 2] = [TokenKind::OpenBracketBang, TokenKind::HyphenHyphen];
const COMMENT_CLOSE: [TokenKind; 2] = [TokenKind::HyphenHyphen, TokenKind::CloseBracket];
const ALPHANUMERIC: [TokenKind; 2] = [TokenKind::Alpha, TokenKind::Numeric];

const ATTRIBUTE_VALUE_END: [TokenKind; 6] = [
    TokenKind::Quote,
    TokenKind::Eof,
    TokenKind::NewLine,
    TokenKind::Unknown,
    TokenKind::SlashCloseBracket,
    TokenKind::CloseBracket,
];
const ELEMENT_VALUE_END: [TokenKind; 3] = [
    TokenKind::OpenBracketSlash,
    TokenKind::Eof,
    TokenKind::Unknown,
];

/// Deepest element nesting parsed as a tree. Anything nested deeper is kept
/// as raw content of the element at this depth.
pub const MAX_ELEMENT_DEPTH: usize = 256;

/// Result of parsing a whole document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    /// `None` when the input holds neither an element nor any trivia.
    pub syntax: Option<DocumentSyntax>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse a token stream into a document syntax tree.
///
/// Never fails: malformed input yields partial nodes plus diagnostics.
#[must_use]
pub fn parse(tokens: &TokenStream) -> ParsedDocument {
    let mut parser = Parser::new(tokens);
    let syntax = parser.parse_document();
    let diagnostics = parser.into_diagnostics();

    debug!(
        diagnostics = diagnostics.len(),
        has_root = syntax.is_some(),
        "parsed document"
    );
    ParsedDocument {
        syntax,
        diagnostics,
    }
}

/// Recursive-descent parser over a token stream.
///
/// Every rule either declines (returns `None` without consuming anything)
/// or returns a node, possibly partial, having reported what was missing.
/// Rules are public so callers can parse fragments.
pub struct Parser<'a> {
    tokens: Cursor<TokenWindow<'a>>,
    diagnostics: Vec<Diagnostic>,
    depth: usize,
}

impl<'a> Parser<'a> {
    #[must_use]
    pub fn new(tokens: &'a TokenStream) -> Self {
        Self {
            tokens: Cursor::new(TokenWindow::new(tokens)),
            diagnostics: Vec::new(),
            depth: 0,
        }
    }

    /// Diagnostics reported so far, in discovery order.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    #[must_use]
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// The next uncommitted token.
    #[must_use]
    pub fn current(&self) -> &'a Token {
        self.tokens.current()
    }

    // ------------------------------------------------------------------
    // Symbols
    // ------------------------------------------------------------------

    pub fn parse_partial_symbol(&mut self) -> Option<PartialSymbolSyntax> {
        if !self.matches(TokenKind::Alpha, 0) {
            return None;
        }

        loop {
            match self.tokens.peek(1).kind {
                TokenKind::Alpha | TokenKind::Numeric => self.tokens.shift_right(1),
                TokenKind::Hyphen if self.matches_any(&ALPHANUMERIC, 2) => {
                    self.tokens.shift_right(2);
                }
                _ => break,
            }
        }

        Some(PartialSymbolSyntax {
            tokens: self.consume_tokens(),
        })
    }

    pub fn parse_compound_symbol(&mut self) -> Option<CompoundSymbolSyntax> {
        let first = self.parse_partial_symbol()?;

        let mut nodes = vec![SyntaxNode::PartialSymbol(first)];
        while self.matches(TokenKind::Period, 0) {
            let delimiter = self.consume_single(0);
            let delimiter_span = delimiter.span();
            nodes.push(SyntaxNode::Single(delimiter));

            match self.parse_partial_symbol() {
                Some(next) => nodes.push(SyntaxNode::PartialSymbol(next)),
                None => self.report(ParseDiagnostic::IncompleteCompoundSymbol, delimiter_span),
            }
        }

        Some(CompoundSymbolSyntax { nodes })
    }

    pub fn parse_namespaced_symbol(&mut self) -> Option<NamespacedSymbolSyntax> {
        let first = self.parse_compound_symbol()?;

        let mut nodes = vec![SyntaxNode::CompoundSymbol(first)];
        while self.matches(TokenKind::Slash, 0) {
            let delimiter = self.consume_single(0);
            let delimiter_span = delimiter.span();
            nodes.push(SyntaxNode::Single(delimiter));

            match self.parse_compound_symbol() {
                Some(next) => nodes.push(SyntaxNode::CompoundSymbol(next)),
                None => self.report(ParseDiagnostic::IncompleteNamespacedSymbol, delimiter_span),
            }
        }

        let symbol = NamespacedSymbolSyntax { nodes };
        if symbol.nodes.len() == 1 {
            self.report(ParseDiagnostic::MissingNamespace, symbol.span());
        }
        Some(symbol)
    }

    pub fn parse_interpolated_symbol(&mut self) -> Option<InterpolatedSymbolSyntax> {
        if !self.matches(TokenKind::AtOpenBrace, 0) {
            return None;
        }

        let open = self.consume_single(0);
        let symbol = self.parse_namespaced_symbol();
        let close = self
            .matches(TokenKind::CloseBraceAt, 0)
            .then(|| self.consume_single(0));

        let interpolated = InterpolatedSymbolSyntax {
            open,
            symbol,
            close,
        };
        if !interpolated.is_terminated() {
            self.report(ParseDiagnostic::NonTerminatedInterpolation, interpolated.span());
        }
        Some(interpolated)
    }

    // ------------------------------------------------------------------
    // Content and attributes
    // ------------------------------------------------------------------

    /// Raw tokens up to (not including) any of `terminators` or EOF, with an
    /// interpolation spliced in wherever `@{` appears.
    pub fn parse_content(&mut self, terminators: &[TokenKind]) -> Option<ContentSyntax> {
        let mut nodes = Vec::new();

        while !self.matches_any(terminators, 0) && !self.matches(TokenKind::Eof, 0) {
            if self.matches(TokenKind::AtOpenBrace, 0) {
                let Some(interpolated) = self.parse_interpolated_symbol() else {
                    unreachable!("'@{{' matched but no interpolation was parsed");
                };
                nodes.push(SyntaxNode::InterpolatedSymbol(interpolated));
            } else {
                nodes.push(SyntaxNode::Single(self.consume_single(0)));
            }
        }

        (!nodes.is_empty()).then_some(ContentSyntax { nodes })
    }

    pub fn parse_attribute(&mut self) -> Option<AttributeSyntax> {
        let name = self.parse_partial_symbol()?;

        // name
        let mut attribute = AttributeSyntax {
            name,
            equal: None,
            open_quote: None,
            contents: None,
            close_quote: None,
        };

        if !self.matches(TokenKind::Equal, 0) {
            self.report(ParseDiagnostic::MissingAttributeAssignment, attribute.span());
            return Some(attribute);
        }
        // name=
        attribute.equal = Some(self.consume_single(0));

        if !self.matches(TokenKind::Quote, 0) {
            self.report(ParseDiagnostic::MissingAttributeAssignment, attribute.span());
            return Some(attribute);
        }
        // name="
        attribute.open_quote = Some(self.consume_single(0));

        if self.matches(TokenKind::Quote, 0) {
            // name=""
            attribute.close_quote = Some(self.consume_single(0));
            return Some(attribute);
        }

        if self.matches_any(&[TokenKind::Eof, TokenKind::NewLine, TokenKind::Unknown], 0) {
            self.report(ParseDiagnostic::NonTerminatedString, attribute.span());
            return Some(attribute);
        }

        attribute.contents = self.parse_content(&ATTRIBUTE_VALUE_END);
        attribute.close_quote = self
            .matches(TokenKind::Quote, 0)
            .then(|| self.consume_single(0));

        if attribute.close_quote.is_none() {
            self.report(ParseDiagnostic::NonTerminatedString, attribute.span());
        }
        Some(attribute)
    }

    // ------------------------------------------------------------------
    // Tags and trivia
    // ------------------------------------------------------------------

    pub fn parse_closing_tag(&mut self) -> Option<ClosingTagSyntax> {
        if !self.matches(TokenKind::OpenBracketSlash, 0) {
            return None;
        }

        let mut tag = ClosingTagSyntax {
            open: self.consume_single(0),
            name: None,
            close: None,
        };

        self.collect_whitespace();
        if !self.matches(TokenKind::Alpha, 0) {
            self.report(ParseDiagnostic::IncompleteXmlCloseTag, tag.span());
            return Some(tag);
        }
        tag.name = Some(self.consume_single(0));

        self.collect_whitespace();
        if !self.matches(TokenKind::CloseBracket, 0) {
            self.report(ParseDiagnostic::IncompleteXmlCloseTag, tag.span());
            return Some(tag);
        }
        tag.close = Some(self.consume_single(0));
        Some(tag)
    }

    pub fn parse_comment(&mut self) -> Option<CommentSyntax> {
        if !self.matches_sequence(&COMMENT_OPEN, 0) {
            return None;
        }

        let open = self.consume_single(1);

        let mut contents = Vec::new();
        while !self.matches(TokenKind::Eof, 0) && !self.matches_sequence(&COMMENT_CLOSE, 0) {
            contents.push(SyntaxNode::Single(self.consume_single(0)));
        }

        let mut comment = CommentSyntax {
            open,
            contents: build_sequence(contents),
            close: None,
        };

        if self.matches(TokenKind::Eof, 0) {
            self.report(ParseDiagnostic::NonTerminatedComment, comment.span());
            return Some(comment);
        }

        comment.close = Some(self.consume_single(1));
        Some(comment)
    }

    /// Whitespace runs and comments, in any order. Never declines.
    pub fn parse_trivia(&mut self) -> TriviaSyntax {
        let mut nodes = Vec::new();

        while !self.matches(TokenKind::Eof, 0) {
            let next = if self.matches(TokenKind::OpenBracketBang, 0) {
                self.parse_comment().map(SyntaxNode::Comment)
            } else {
                self.collect_whitespace().map(SyntaxNode::Single)
            };

            match next {
                Some(node) => nodes.push(node),
                None => break,
            }
        }

        TriviaSyntax { nodes }
    }

    // ------------------------------------------------------------------
    // Elements
    // ------------------------------------------------------------------

    /// An element with its leading trivia.
    ///
    /// Declines only when there is neither trivia nor a `<`; trivia with no
    /// following tag is returned as a trivia-only element.
    pub fn parse_element(&mut self) -> Option<ElementSyntax> {
        self.collect_whitespace();
        let leading_trivia = self.parse_trivia();

        if !self.matches(TokenKind::OpenBracket, 0) {
            return (!leading_trivia.is_empty()).then(|| ElementSyntax {
                leading_trivia,
                ..ElementSyntax::default()
            });
        }

        let mut element = ElementSyntax {
            leading_trivia,
            open_bracket: Some(self.consume_single(0)),
            ..ElementSyntax::default()
        };
        self.collect_whitespace();

        if self.matches_any(&OPEN_TAG_END, 0) {
            // <> or </>
            element.open_tag_end = Some(self.consume_single(0));
            self.report(ParseDiagnostic::MissingElementName, element.span());
            return Some(element);
        }

        if self.matches(TokenKind::Eof, 0) {
            // <
            let span = element.open_bracket.as_ref().and_then(SingleSyntax::span);
            self.report(ParseDiagnostic::NonTerminatedElementTag, span);
            return Some(element);
        }

        self.parse_open_tag(&mut element);
        if element.open_tag_end.is_none() {
            return Some(element);
        }
        if element.open_tag_end.as_ref().and_then(SingleSyntax::first_kind)
            == Some(TokenKind::SlashCloseBracket)
        {
            return Some(element);
        }

        self.parse_element_body(&mut element);
        Some(element)
    }

    /// Name, attributes, and the `>` or `/>` that ends the open tag. Leaves
    /// `open_tag_end` empty when input runs out first.
    fn parse_open_tag(&mut self, element: &mut ElementSyntax) {
        while !self.matches_any(&WHITESPACE, 1)
            && !self.matches_any(&OPEN_TAG_END, 1)
            && !self.matches(TokenKind::Eof, 1)
        {
            self.tokens.shift_right(1);
        }
        let name = self.consume_single(0);
        if name.tokens.len() != 1 || name.first_kind() != Some(TokenKind::Alpha) {
            // <alpha[BAD]
            self.report(ParseDiagnostic::InvalidElementName, name.span());
        }
        element.name = Some(name);

        let mut gap = self.collect_whitespace();
        while !self.matches_any(&OPEN_TAG_END, 0) && !self.matches(TokenKind::Eof, 0) {
            let Some(attribute) = self.parse_attribute() else {
                break;
            };

            if gap.is_none() {
                // <elem a=""b=""
                self.report(ParseDiagnostic::MissingAttributeSpacing, attribute.name.span());
            }
            element.attributes.push(attribute);

            gap = self.collect_whitespace();
        }

        loop {
            if self.matches(TokenKind::Eof, 0) {
                // <elem a=""
                self.report(ParseDiagnostic::NonTerminatedElementTag, element.span());
                return;
            }

            if self.matches_any(&OPEN_TAG_END, 0) {
                element.open_tag_end = Some(self.consume_single(0));
                return;
            }

            // <elem a="" [BAD]
            let stray = self.consume_single(0);
            self.report(ParseDiagnostic::InvalidToken, stray.span());
        }
    }

    /// Children and closing tag following `>`.
    fn parse_element_body(&mut self, element: &mut ElementSyntax) {
        if self.depth >= MAX_ELEMENT_DEPTH {
            self.report(ParseDiagnostic::NestingTooDeep, element.span());
            element.children = self
                .skip_nested_markup()
                .map(SyntaxNode::Content)
                .into_iter()
                .collect();
            element.closing_tag = self.parse_closing_tag();
            if element.closing_tag.is_none() {
                self.report(ParseDiagnostic::NonTerminatedXmlDocument, element.span());
            }
            return;
        }

        let mut children = Vec::new();
        self.depth += 1;
        loop {
            self.collect_whitespace();
            match self.parse_element() {
                Some(child) => children.push(SyntaxNode::Element(child)),
                None => break,
            }
        }
        self.depth -= 1;

        if self.matches(TokenKind::Eof, 0) {
            // <elem>[CHILDREN][EOF]
            element.children = children;
            self.report(ParseDiagnostic::NonTerminatedXmlDocument, element.span());
            return;
        }

        if self.matches(TokenKind::OpenBracketSlash, 0) {
            // <elem>[CHILDREN]</elem>
            element.children = children;
            element.closing_tag = self.parse_closing_tag();
            return;
        }

        if !children.is_empty() {
            // <elem>[CHILDREN]???
            while !self.matches_any(&[TokenKind::OpenBracketSlash, TokenKind::Eof], 1) {
                self.tokens.shift_right(1);
            }
            let invalid = self.consume_single(0);

            element.children = children;
            element.closing_tag = self.parse_closing_tag();
            self.report(ParseDiagnostic::InvalidElementValue, invalid.span());
            return;
        }

        // <elem>[VALUE]
        if let Some(contents) = self.parse_content(&ELEMENT_VALUE_END) {
            children.push(SyntaxNode::Content(contents));
        }
        element.children = children;
        element.closing_tag = self.parse_closing_tag();

        if element.closing_tag.is_none() {
            self.report(ParseDiagnostic::NonTerminatedXmlDocument, element.span());
        }
    }

    /// Tokens up to the `</` that closes the current element, taken as flat
    /// content. Tags in between are counted, not parsed.
    fn skip_nested_markup(&mut self) -> Option<ContentSyntax> {
        let mut open = 0usize;
        let mut nodes = Vec::new();
        loop {
            match self.tokens.current().kind {
                TokenKind::Eof => break,
                TokenKind::OpenBracketSlash if open == 0 => break,
                TokenKind::OpenBracketSlash | TokenKind::SlashCloseBracket => {
                    open = open.saturating_sub(1);
                }
                TokenKind::OpenBracket if self.matches(TokenKind::Alpha, 1) => open += 1,
                _ => {}
            }
            nodes.push(SyntaxNode::Single(self.consume_single(0)));
        }
        (!nodes.is_empty()).then_some(ContentSyntax { nodes })
    }

    /// Root element followed by trailing trivia.
    pub fn parse_document(&mut self) -> Option<DocumentSyntax> {
        let root = self.parse_element()?;
        let trailing_trivia = self.parse_trivia();
        Some(DocumentSyntax {
            root,
            trailing_trivia,
        })
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn matches(&self, kind: TokenKind, offset: usize) -> bool {
        self.tokens.peek(offset).kind == kind
    }

    fn matches_any(&self, kinds: &[TokenKind], offset: usize) -> bool {
        kinds.contains(&self.tokens.peek(offset).kind)
    }

    fn matches_sequence(&self, kinds: &[TokenKind], offset: usize) -> bool {
        kinds
            .iter()
            .enumerate()
            .all(|(idx, kind)| self.tokens.peek(offset + idx).kind == *kind)
    }

    /// Consume a run of whitespace and newline tokens as one node.
    fn collect_whitespace(&mut self) -> Option<SingleSyntax> {
        if !self.matches_any(&WHITESPACE, 0) {
            return None;
        }

        while self.matches_any(&WHITESPACE, 1) {
            self.tokens.shift_right(1);
        }
        Some(self.consume_single(0))
    }

    fn consume_tokens(&mut self) -> Vec<Token> {
        self.tokens.consume(0).to_vec()
    }

    /// Consume the current token plus `shift` more.
    fn consume_single(&mut self, shift: usize) -> SingleSyntax {
        SingleSyntax {
            tokens: self.tokens.consume(shift).to_vec(),
        }
    }

    fn report(&mut self, kind: ParseDiagnostic, span: Option<Span>) {
        let span = span.unwrap_or(self.tokens.window().last().span);
        let diagnostic = Diagnostic::new(kind, span);
        trace!(%diagnostic, "parse diagnostic");
        self.diagnostics.push(diagnostic);
    }
}

fn build_sequence(nodes: Vec<SyntaxNode>) -> Option<SequenceSyntax> {
    (!nodes.is_empty()).then_some(SequenceSyntax { nodes })
}
