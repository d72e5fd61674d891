use std::collections::HashSet;

use tracing::{debug, trace};

use crate::bound::{
    BoundAttribute, BoundDocument, BoundElement, BoundNode, BoundNodeKind, BoundSpan, BoundSymbol,
    BoundValue, BoundValueSequence, DocumentKind, VariableReferenceBag,
};
use crate::diagnostic::Diagnostic;
use crate::syntax::{
    AttributeSyntax, DocumentSyntax, ElementForm, ElementSyntax, NamespacedSymbolSyntax,
    SyntaxKind, SyntaxNode,
};
use crate::text::{SourceText, Span};

/// Root tag name that allows embedded variable references.
pub const JOB_ROOT: &str = "job";

/// Problems the binder reports.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindDiagnostic {
    #[error("Closing tag does not align. Expected: {expected}")]
    NonMatchingElementTags { expected: String },
    #[error("Encountered unexpected syntax of kind: {kind}")]
    UnexpectedSyntax { kind: SyntaxKind },
    #[error("Failed to bind instance of {kind}")]
    BindingError { kind: BoundNodeKind },
    #[error("Unbindable symbol.")]
    MalformedSymbol,
    #[error("Duplicate attribute")]
    DuplicateAttribute,
    #[error("Unexpected symbol. Only job documents may contain embedded symbols.")]
    UnexpectedSymbol,
}

/// Result of binding a whole document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundResult {
    pub document: BoundDocument,
    pub diagnostics: Vec<Diagnostic>,
}

/// Bind a parsed document against the text it was parsed from.
#[must_use]
pub fn bind(text: &SourceText, syntax: &DocumentSyntax) -> BoundResult {
    let mut context = BindingContext::new(text);
    let document = context.bind_document(syntax);
    BoundResult {
        document,
        diagnostics: context.into_diagnostics(),
    }
}

/// Accumulates diagnostics and variable references while syntax nodes are
/// bound. Accessors hand out copies, never the live state.
#[derive(Debug, Clone)]
pub struct BindingContext<'a> {
    text: &'a SourceText,
    diagnostics: Vec<Diagnostic>,
    references: VariableReferenceBag,
}

impl<'a> BindingContext<'a> {
    #[must_use]
    pub fn new(text: &'a SourceText) -> Self {
        Self {
            text,
            diagnostics: Vec::new(),
            references: VariableReferenceBag::new(),
        }
    }

    /// Snapshot of the diagnostics reported so far.
    #[must_use]
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.clone()
    }

    /// Snapshot of every variable reference bound so far.
    #[must_use]
    pub fn references(&self) -> VariableReferenceBag {
        self.references.clone()
    }

    #[must_use]
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Bind any node that has a bound counterpart.
    pub fn bind(&mut self, node: &SyntaxNode) -> Option<BoundNode> {
        match node {
            SyntaxNode::Document(document) => {
                Some(BoundNode::Document(self.bind_document(document)))
            }
            SyntaxNode::Element(element) => self.bind_element(element).map(BoundNode::Element),
            SyntaxNode::Attribute(attribute) => {
                self.bind_attribute(attribute).map(BoundNode::Attribute)
            }
            SyntaxNode::NamespacedSymbol(symbol) => self.bind_symbol(symbol).map(BoundNode::Symbol),
            SyntaxNode::InterpolatedSymbol(interpolated) => interpolated
                .symbol
                .as_ref()
                .and_then(|symbol| self.bind_symbol(symbol))
                .map(BoundNode::Symbol),
            SyntaxNode::Content(content) => Some(BoundNode::ValueSequence(
                self.bind_value_sequence(&content.nodes),
            )),
            SyntaxNode::Single(_)
            | SyntaxNode::Sequence(_)
            | SyntaxNode::PartialSymbol(_)
            | SyntaxNode::CompoundSymbol(_)
            | SyntaxNode::ClosingTag(_)
            | SyntaxNode::Comment(_)
            | SyntaxNode::Trivia(_) => None,
        }
    }

    /// Bind the root element, then decide whether the references collected
    /// along the way are allowed.
    pub fn bind_document(&mut self, syntax: &DocumentSyntax) -> BoundDocument {
        let root = self.bind_element(&syntax.root);
        if root.is_none() {
            self.report(
                BindDiagnostic::BindingError {
                    kind: BoundNodeKind::Element,
                },
                syntax.root.span(),
            );
        }

        let references = self.references();
        let kind = match &root {
            Some(element) if element.name().eq_ignore_ascii_case(JOB_ROOT) => {
                DocumentKind::ForemanJob
            }
            _ => DocumentKind::Generic,
        };

        if kind == DocumentKind::Generic {
            for span in references.spans() {
                self.report(BindDiagnostic::UnexpectedSymbol, Some(span));
            }
        }

        debug!(
            ?kind,
            references = references.len(),
            diagnostics = self.diagnostics.len(),
            "bound document"
        );
        BoundDocument {
            kind,
            root,
            references,
        }
    }

    /// Bind an element whose name and tag end both parsed; anything less
    /// yields `None` and it is up to the caller to report it.
    pub fn bind_element(&mut self, syntax: &ElementSyntax) -> Option<BoundElement> {
        let (name, closing_name) = match syntax.form() {
            ElementForm::SelfClosing { name } => (name, None),
            ElementForm::Paired { name, closing_name } => (name, Some(closing_name)),
            ElementForm::TriviaOnly | ElementForm::Incomplete => return None,
        };

        let open_tag = self.bind_string(name.span()?);
        if let Some(closing_span) = closing_name.and_then(|closing| closing.span()) {
            let close_tag = self.bind_string(closing_span);
            if open_tag.data != close_tag.data {
                self.report(
                    BindDiagnostic::NonMatchingElementTags {
                        expected: open_tag.data.clone(),
                    },
                    Some(close_tag.span),
                );
            }
        }

        let mut keys = HashSet::new();
        let mut attributes = Vec::new();
        for attribute_syntax in &syntax.attributes {
            let Some(attribute) = self.bind_attribute(attribute_syntax) else {
                self.report(
                    BindDiagnostic::BindingError {
                        kind: BoundNodeKind::Attribute,
                    },
                    attribute_syntax.span(),
                );
                continue;
            };

            if !keys.insert(attribute.key.data.clone()) {
                self.report(BindDiagnostic::DuplicateAttribute, Some(attribute.span));
            }
            attributes.push(attribute);
        }

        let mut content = None;
        let mut children = Vec::new();
        match syntax.children.as_slice() {
            // <elem>text with @{interpolation}@</elem>
            [SyntaxNode::Content(value)] => {
                content = Some(self.bind_value_sequence(&value.nodes));
            }
            // <elem><child/></elem>
            nodes => {
                for node in nodes {
                    match node {
                        SyntaxNode::Comment(_) | SyntaxNode::Trivia(_) => {}
                        SyntaxNode::Element(child) if child.is_trivia_only() => {}
                        SyntaxNode::Element(child) => match self.bind_element(child) {
                            Some(bound) => children.push(bound),
                            None => self.report(
                                BindDiagnostic::BindingError {
                                    kind: BoundNodeKind::Element,
                                },
                                child.span(),
                            ),
                        },
                        other => self.report(
                            BindDiagnostic::UnexpectedSyntax { kind: other.kind() },
                            other.span(),
                        ),
                    }
                }
            }
        }

        Some(BoundElement {
            open_tag,
            attributes,
            content,
            children,
        })
    }

    /// Bind `name="value"`. Both quotes must be present.
    pub fn bind_attribute(&mut self, syntax: &AttributeSyntax) -> Option<BoundAttribute> {
        if !syntax.is_terminated() {
            return None;
        }

        let key = self.bind_string(syntax.name.span()?);
        let value = match &syntax.contents {
            Some(contents) => self.bind_value_sequence(&contents.nodes),
            None => BoundValueSequence::default(),
        };

        Some(BoundAttribute {
            span: syntax.span()?,
            key,
            value,
        })
    }

    /// Bind `namespace/key`. Needs at least one `/`: the node count must be
    /// odd and at least three. Every bound symbol is recorded as a reference.
    pub fn bind_symbol(&mut self, syntax: &NamespacedSymbolSyntax) -> Option<BoundSymbol> {
        let count = syntax.nodes.len();
        if count % 2 != 1 || count < 3 {
            self.report(BindDiagnostic::MalformedSymbol, syntax.span());
            return None;
        }

        let namespace_span = Span::cover(syntax.nodes[..count - 2].iter().filter_map(SyntaxNode::span))?;
        let key_span = syntax.nodes[count - 1].span()?;

        let symbol = BoundSymbol {
            namespace: self.bind_string(namespace_span),
            key: self.bind_string(key_span),
        };
        self.references.add(symbol.identifier(), symbol.span());
        Some(symbol)
    }

    /// Coalesce adjoining literal tokens into one span each, keeping bound
    /// interpolations in between.
    fn bind_value_sequence(&mut self, nodes: &[SyntaxNode]) -> BoundValueSequence {
        let mut values = Vec::new();
        let mut literal: Option<Span> = None;

        for node in nodes {
            match node {
                SyntaxNode::Single(single) => {
                    literal = Span::cover(literal.into_iter().chain(single.span()));
                }
                SyntaxNode::InterpolatedSymbol(interpolated) => {
                    if let Some(span) = literal.take() {
                        values.push(BoundValue::Literal(self.bind_string(span)));
                    }

                    let bound = interpolated
                        .symbol
                        .as_ref()
                        .and_then(|symbol| self.bind_symbol(symbol));
                    match bound {
                        Some(symbol) => values.push(BoundValue::Symbol(symbol)),
                        None => self.report(
                            BindDiagnostic::BindingError {
                                kind: BoundNodeKind::Symbol,
                            },
                            interpolated.span(),
                        ),
                    }
                }
                other => self.report(
                    BindDiagnostic::UnexpectedSyntax { kind: other.kind() },
                    other.span(),
                ),
            }
        }

        if let Some(span) = literal {
            values.push(BoundValue::Literal(self.bind_string(span)));
        }
        BoundValueSequence { nodes: values }
    }

    fn bind_string(&self, span: Span) -> BoundSpan<String> {
        BoundSpan::new(span, self.text.substring(span).unwrap_or_default())
    }

    fn report(&mut self, kind: BindDiagnostic, span: Option<Span>) {
        let span = span.unwrap_or_else(|| Span::none(self.text.id()));
        let diagnostic = Diagnostic::new(kind, span);
        trace!(%diagnostic, "bind diagnostic");
        self.diagnostics.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::{Parser, parse};

    fn bind_source(input: &str) -> BoundResult {
        let text = SourceText::new(input);
        let tokens = tokenize(&text);
        let parsed = parse(&tokens);
        let syntax = parsed.syntax.expect("document");
        bind(&text, &syntax)
    }

    #[test]
    fn symbol_needs_a_namespace() {
        let text = SourceText::new("wow");
        let tokens = tokenize(&text);
        let mut parser = Parser::new(&tokens);
        let symbol = parser.parse_namespaced_symbol().expect("symbol node");

        let mut context = BindingContext::new(&text);
        assert!(context.bind_symbol(&symbol).is_none());
        assert_eq!(
            context.diagnostics()[0].message,
            BindDiagnostic::MalformedSymbol.to_string()
        );
        assert!(context.references().is_empty());
    }

    #[test]
    fn symbol_namespace_covers_all_but_key() {
        let text = SourceText::new("a.b/c/key-1");
        let tokens = tokenize(&text);
        let mut parser = Parser::new(&tokens);
        let symbol = parser.parse_namespaced_symbol().expect("symbol node");

        let mut context = BindingContext::new(&text);
        let bound = context.bind_symbol(&symbol).expect("bound symbol");
        assert_eq!(bound.namespace.data, "a.b/c");
        assert_eq!(bound.key.data, "key-1");
        assert_eq!(context.references().len(), 1);
    }

    #[test]
    fn literals_coalesce_around_interpolations() {
        let result = bind_source("<job>a b@{v/k}@c d</job>");
        let root = result.document.root.expect("root");
        let content = root.content.expect("content");
        assert_eq!(content.nodes.len(), 3);
        assert!(matches!(&content.nodes[0], BoundValue::Literal(lit) if lit.data == "a b"));
        assert!(matches!(&content.nodes[1], BoundValue::Symbol(sym) if sym.key.data == "k"));
        assert!(matches!(&content.nodes[2], BoundValue::Literal(lit) if lit.data == "c d"));
    }

    #[test]
    fn snapshots_do_not_track_later_binding() {
        let text = SourceText::new("@{v/a}@ @{v/b}@");
        let tokens = tokenize(&text);
        let mut parser = Parser::new(&tokens);
        let content = parser.parse_content(&[]).expect("content");

        let mut context = BindingContext::new(&text);
        let before = context.references();
        let bound = context.bind(&SyntaxNode::Content(content));
        assert!(matches!(bound, Some(BoundNode::ValueSequence(_))));
        assert!(before.is_empty());
        assert_eq!(context.references().len(), 2);
    }

    #[test]
    fn unterminated_attribute_fails_to_bind() {
        let result = bind_source("<a x=\"1/>");
        assert!(
            result
                .diagnostics
                .iter()
                .any(|d| d.message == "Failed to bind instance of Attribute")
        );
    }

    #[test]
    fn incomplete_root_reports_binding_error() {
        let result = bind_source("<a>");
        assert!(result.document.root.is_none());
        assert_eq!(
            result.diagnostics[0].message,
            "Failed to bind instance of Element"
        );
    }
}
