//! Serialization of the element model as indented XML.

use std::fmt::Write as _;

use crate::config::INDENT;
use crate::element::{Document, Element};

/// Escape text content.
fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape an attribute value for use between double quotes.
fn escape_attribute(value: &str) -> String {
    escape_text(value)
        .replace('"', "&quot;")
        .replace('\n', "&#10;")
        .replace('\t', "&#9;")
}

fn write_node(out: &mut String, element: &Element, depth: usize) {
    let indent = INDENT.repeat(depth);
    out.push_str(&indent);
    out.push('<');
    out.push_str(element.name());
    for (name, value) in element.attributes() {
        // Writing into a String cannot fail
        let _ = write!(out, " {name}=\"{}\"", escape_attribute(value));
    }

    let text = element.text().map(escape_text);
    match (text, element.children().is_empty()) {
        (None, true) => out.push_str("/>\n"),
        (Some(text), true) => {
            let _ = writeln!(out, ">{text}</{}>", element.name());
        }
        (text, false) => {
            out.push_str(">\n");
            if let Some(text) = text {
                let _ = writeln!(out, "{indent}{INDENT}{text}");
            }
            for child in element.children() {
                write_node(out, child, depth + 1);
            }
            let _ = writeln!(out, "{indent}</{}>", element.name());
        }
    }
}

/// Serialize an element subtree with two-space indentation.
///
/// # Examples
/// ```
/// use descriptor_merge::element::Element;
/// use descriptor_merge::grammar::Tag;
/// use descriptor_merge::xml::write_element;
///
/// let tag = |name: &str| Tag::new("web-app", name);
/// let param = Element::new(tag("context-param"))
///     .with_child(Element::new(tag("param-name")).with_text("a&b"))
///     .with_child(Element::new(tag("param-value")));
///
/// assert_eq!(
///     write_element(&param),
///     "<context-param>\n  <param-name>a&amp;b</param-name>\n  <param-value/>\n</context-param>\n"
/// );
/// ```
pub fn write_element(element: &Element) -> String {
    let mut out = String::new();
    write_node(&mut out, element, 0);
    out
}

/// Serialize a document with XML declaration and doctype.
pub fn write_document(document: &Document) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    if let Some(doctype) = document.doctype() {
        out.push_str(doctype);
        out.push('\n');
    }
    write_node(&mut out, &document.root_element(), 0);
    out
}
