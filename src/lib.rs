//! Foreman document lexer, parser, binder, renderer, and semantic
//! classifier.
//!
//! Foreman documents are XML-like job descriptions that may embed variable
//! references written `@{namespace/key}@`. This crate turns source text
//! into a full-fidelity syntax tree, validates it into a bound tree, renders
//! the bound tree with variable values substituted, and classifies the
//! syntax for editor highlighting. Nothing in the pipeline fails on
//! malformed input: every stage returns a best-effort result plus
//! diagnostics.
//!
//! # Quick start
//!
//! ## Compile and render a job
//!
//! ```
//! use foreman_analysis::{VariableIdentifier, VariableValueBag, compile};
//!
//! let compilation = compile(r#"<job><step cmd="echo @{env/name}@"/></job>"#);
//! assert!(!compilation.has_errors());
//!
//! let values = VariableValueBag::new()
//!     .with(VariableIdentifier::new("env", "name"), "prod");
//! assert_eq!(
//!     compilation.render(&values),
//!     r#"<job><step cmd="echo prod"/></job>"#
//! );
//! ```
//!
//! ## Collect diagnostics
//!
//! ```
//! use foreman_analysis::compile;
//!
//! let compilation = compile("<a></b>");
//! let messages: Vec<String> = compilation
//!     .diagnostics()
//!     .map(|d| d.message.clone())
//!     .collect();
//! assert_eq!(messages, ["Closing tag does not align. Expected: a"]);
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod binder;
pub mod bound;
pub mod cursor;
pub mod diagnostic;
pub mod lexer;
pub mod parser;
pub mod render;
pub mod semantic;
pub mod syntax;
pub mod text;
pub mod token;

pub use binder::{BindDiagnostic, BindingContext, BoundResult, bind};
pub use bound::{
    BoundAttribute, BoundDocument, BoundElement, BoundNode, BoundNodeKind, BoundSpan, BoundSymbol,
    BoundValue, BoundValueSequence, DocumentKind, IdentifierError, VariableIdentifier,
    VariableReferenceBag, VariableValueBag,
};
pub use diagnostic::Diagnostic;
pub use lexer::tokenize;
pub use parser::{MAX_ELEMENT_DEPTH, ParseDiagnostic, ParsedDocument, Parser, parse};
pub use render::render;
pub use semantic::{SemanticToken, SemanticTokenKind, document_tokens, encode_relative};
pub use syntax::{DocumentSyntax, ElementForm, SyntaxKind, SyntaxNode};
pub use text::{DocumentId, SourceText, Span, TextError};
pub use token::{Token, TokenKind, TokenStream};

/// Every stage's output for one document.
#[derive(Debug, Clone)]
pub struct Compilation {
    pub text: SourceText,
    pub tokens: TokenStream,
    /// `None` for input holding neither an element nor trivia.
    pub syntax: Option<DocumentSyntax>,
    pub parse_diagnostics: Vec<Diagnostic>,
    /// `None` exactly when `syntax` is.
    pub document: Option<BoundDocument>,
    pub bind_diagnostics: Vec<Diagnostic>,
}

impl Compilation {
    /// Parse diagnostics followed by bind diagnostics.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.parse_diagnostics
            .iter()
            .chain(self.bind_diagnostics.iter())
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.parse_diagnostics.is_empty() || !self.bind_diagnostics.is_empty()
    }

    /// Render the bound document; empty when there is none.
    #[must_use]
    pub fn render(&self, values: &VariableValueBag) -> String {
        self.document
            .as_ref()
            .map(|document| render(document, values))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn semantic_tokens(&self) -> Vec<SemanticToken> {
        self.syntax
            .as_ref()
            .map(|syntax| document_tokens(&self.text, syntax))
            .unwrap_or_default()
    }

    /// Variables referenced anywhere in the document.
    #[must_use]
    pub fn variable_references(&self) -> VariableReferenceBag {
        self.document
            .as_ref()
            .map(|document| document.references.clone())
            .unwrap_or_default()
    }
}

/// Lex, parse, and bind a source string in one step.
#[must_use]
pub fn compile(source: &str) -> Compilation {
    compile_text(SourceText::new(source))
}

/// Lex, parse, and bind already-loaded text.
#[must_use]
pub fn compile_text(text: SourceText) -> Compilation {
    let tokens = tokenize(&text);
    let ParsedDocument {
        syntax,
        diagnostics: parse_diagnostics,
    } = parse(&tokens);

    let (document, bind_diagnostics) = match &syntax {
        Some(syntax) => {
            let BoundResult {
                document,
                diagnostics,
            } = bind(&text, syntax);
            (Some(document), diagnostics)
        }
        None => (None, Vec::new()),
    };

    Compilation {
        text,
        tokens,
        syntax,
        parse_diagnostics,
        document,
        bind_diagnostics,
    }
}
