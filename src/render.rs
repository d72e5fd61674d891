//! Renders a bound tree back to text with variables substituted.
//!
//! Output is rebuilt from the bound tree alone: whitespace, comments, and
//! quoting style of the source are not preserved.

use crate::bound::{
    BoundAttribute, BoundDocument, BoundElement, BoundNode, BoundSymbol, BoundValue,
    BoundValueSequence, VariableValueBag,
};

/// Render a bound document. A document without a root renders empty.
#[must_use]
pub fn render(document: &BoundDocument, values: &VariableValueBag) -> String {
    let mut out = String::new();
    if let Some(root) = &document.root {
        render_element(&mut out, root, values);
    }
    out
}

impl BoundNode {
    /// Render this node on its own.
    #[must_use]
    pub fn render(&self, values: &VariableValueBag) -> String {
        let mut out = String::new();
        match self {
            Self::Span(span) => out.push_str(&span.data),
            Self::Symbol(symbol) => render_symbol(&mut out, symbol, values),
            Self::Attribute(attribute) => render_attribute(&mut out, attribute, values),
            Self::Element(element) => render_element(&mut out, element, values),
            Self::ValueSequence(sequence) => render_value_sequence(&mut out, sequence, values),
            Self::Document(document) => {
                if let Some(root) = &document.root {
                    render_element(&mut out, root, values);
                }
            }
        }
        out
    }
}

fn render_element(out: &mut String, element: &BoundElement, values: &VariableValueBag) {
    out.push('<');
    out.push_str(element.name());

    for attribute in &element.attributes {
        out.push(' ');
        render_attribute(out, attribute, values);
    }

    if let Some(content) = &element.content {
        out.push('>');
        render_value_sequence(out, content, values);
        render_close_tag(out, element);
    } else if !element.children.is_empty() {
        out.push('>');
        for child in &element.children {
            render_element(out, child, values);
        }
        render_close_tag(out, element);
    } else {
        out.push_str("/>");
    }
}

fn render_close_tag(out: &mut String, element: &BoundElement) {
    out.push_str("</");
    out.push_str(element.name());
    out.push('>');
}

fn render_attribute(out: &mut String, attribute: &BoundAttribute, values: &VariableValueBag) {
    out.push_str(&attribute.key.data);
    out.push_str("=\"");
    render_value_sequence(out, &attribute.value, values);
    out.push('"');
}

fn render_value_sequence(out: &mut String, sequence: &BoundValueSequence, values: &VariableValueBag) {
    for node in &sequence.nodes {
        match node {
            BoundValue::Literal(literal) => out.push_str(&literal.data),
            BoundValue::Symbol(symbol) => render_symbol(out, symbol, values),
        }
    }
}

fn render_symbol(out: &mut String, symbol: &BoundSymbol, values: &VariableValueBag) {
    out.push_str(values.get(&symbol.identifier()));
}
