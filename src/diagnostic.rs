use std::fmt;

use crate::text::Span;

/// A problem found in a document: what went wrong and where.
///
/// Parse and bind diagnostics share this shape; only the message tells
/// kinds apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    pub fn new(message: impl fmt::Display, span: Span) -> Self {
        Self {
            message: message.to_string(),
            span,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at line {}, column {}",
            self.message,
            self.span.start_line() + 1,
            self.span.start_col() + 1
        )
    }
}
