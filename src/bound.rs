//! Bound tree: the validated shape of a document, with variable references
//! resolved to identifiers.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;

use crate::text::Span;

/// A variable name: `namespace/key`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableIdentifier {
    pub namespace: String,
    pub key: String,
}

/// Error from [`VariableIdentifier::parse`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierError {
    #[error("variable '{0}' has no namespace; expected namespace/key")]
    MissingNamespace(String),
    #[error("variable '{0}' has an empty key")]
    EmptyKey(String),
}

impl VariableIdentifier {
    pub fn new(namespace: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            key: key.into(),
        }
    }

    /// Split on the last `/`: `a/b/key` has namespace `a/b` and key `key`.
    pub fn parse(value: &str) -> Result<Self, IdentifierError> {
        let Some((namespace, key)) = value.rsplit_once('/') else {
            return Err(IdentifierError::MissingNamespace(value.to_string()));
        };
        if namespace.is_empty() {
            return Err(IdentifierError::MissingNamespace(value.to_string()));
        }
        if key.is_empty() {
            return Err(IdentifierError::EmptyKey(value.to_string()));
        }
        Ok(Self::new(namespace, key))
    }
}

impl FromStr for VariableIdentifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VariableIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.key)
    }
}

/// Every place each variable is referenced, in first-seen order.
///
/// `Clone` is a deep copy, so a snapshot handed out never changes when the
/// original keeps accumulating.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableReferenceBag {
    references: IndexMap<VariableIdentifier, Vec<Span>>,
}

impl VariableReferenceBag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, identifier: VariableIdentifier, span: Span) {
        self.references.entry(identifier).or_default().push(span);
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &VariableIdentifier> {
        self.references.keys()
    }

    /// Every recorded span, grouped by identifier. Identifiers come in
    /// first-seen order and each one's spans in source order, so a later
    /// reference to an earlier identifier is yielded before the first
    /// reference to a newer one. This is not overall source order.
    pub fn spans(&self) -> impl Iterator<Item = Span> + '_ {
        self.references.values().flatten().copied()
    }

    #[must_use]
    pub fn get(&self, identifier: &VariableIdentifier) -> Option<&[Span]> {
        self.references.get(identifier).map(Vec::as_slice)
    }

    /// Number of distinct identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.references.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }
}

/// Resolved variable values. Lookups never fail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableValueBag {
    values: HashMap<VariableIdentifier, String>,
}

impl VariableValueBag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, identifier: VariableIdentifier, value: impl Into<String>) {
        self.values.insert(identifier, value.into());
    }

    /// The value of `identifier`, or `""` when it is unset.
    #[must_use]
    pub fn get(&self, identifier: &VariableIdentifier) -> &str {
        self.values.get(identifier).map_or("", String::as_str)
    }

    #[must_use]
    pub fn with(mut self, identifier: VariableIdentifier, value: impl Into<String>) -> Self {
        self.set(identifier, value);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<V: Into<String>> FromIterator<(VariableIdentifier, V)> for VariableValueBag {
    fn from_iter<I: IntoIterator<Item = (VariableIdentifier, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(identifier, value)| (identifier, value.into()))
                .collect(),
        }
    }
}

/// A value together with the source region it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundSpan<T> {
    pub span: Span,
    pub data: T,
}

impl<T> BoundSpan<T> {
    pub const fn new(span: Span, data: T) -> Self {
        Self { span, data }
    }
}

/// A bound `namespace/key` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundSymbol {
    pub namespace: BoundSpan<String>,
    pub key: BoundSpan<String>,
}

impl BoundSymbol {
    #[must_use]
    pub fn identifier(&self) -> VariableIdentifier {
        VariableIdentifier::new(self.namespace.data.clone(), self.key.data.clone())
    }

    #[must_use]
    pub fn span(&self) -> Span {
        self.namespace
            .span
            .union(self.key.span)
            .unwrap_or(self.namespace.span)
    }
}

/// One piece of an attribute or element value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundValue {
    /// Adjoining literal tokens, coalesced.
    Literal(BoundSpan<String>),
    Symbol(BoundSymbol),
}

/// Literal runs interleaved with symbols, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundValueSequence {
    pub nodes: Vec<BoundValue>,
}

impl BoundValueSequence {
    /// Symbols referenced by this value.
    pub fn symbols(&self) -> impl Iterator<Item = &BoundSymbol> {
        self.nodes.iter().filter_map(|node| match node {
            BoundValue::Symbol(symbol) => Some(symbol),
            BoundValue::Literal(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundAttribute {
    pub span: Span,
    pub key: BoundSpan<String>,
    pub value: BoundValueSequence,
}

/// A well-formed element. Holds either value content or child elements,
/// never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundElement {
    pub open_tag: BoundSpan<String>,
    pub attributes: Vec<BoundAttribute>,
    pub content: Option<BoundValueSequence>,
    pub children: Vec<Self>,
}

impl BoundElement {
    /// Element name as written in the open tag.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.open_tag.data
    }

    /// First attribute named `key`.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&BoundAttribute> {
        self.attributes.iter().find(|attr| attr.key.data == key)
    }
}

/// What a document's root makes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Generic,
    /// Root tag is `job` (any case); may embed variable references.
    ForemanJob,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundDocument {
    pub kind: DocumentKind,
    pub root: Option<BoundElement>,
    pub references: VariableReferenceBag,
}

impl BoundDocument {
    #[must_use]
    pub const fn is_job(&self) -> bool {
        matches!(self.kind, DocumentKind::ForemanJob)
    }
}

/// Discriminant of [`BoundNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundNodeKind {
    Span,
    Symbol,
    Attribute,
    Element,
    ValueSequence,
    Document,
    ForemanJob,
}

impl fmt::Display for BoundNodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Any bound node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundNode {
    Span(BoundSpan<String>),
    Symbol(BoundSymbol),
    Attribute(BoundAttribute),
    Element(BoundElement),
    ValueSequence(BoundValueSequence),
    Document(BoundDocument),
}

impl BoundNode {
    #[must_use]
    pub const fn kind(&self) -> BoundNodeKind {
        match self {
            Self::Span(_) => BoundNodeKind::Span,
            Self::Symbol(_) => BoundNodeKind::Symbol,
            Self::Attribute(_) => BoundNodeKind::Attribute,
            Self::Element(_) => BoundNodeKind::Element,
            Self::ValueSequence(_) => BoundNodeKind::ValueSequence,
            Self::Document(document) if document.is_job() => BoundNodeKind::ForemanJob,
            Self::Document(_) => BoundNodeKind::Document,
        }
    }
}
