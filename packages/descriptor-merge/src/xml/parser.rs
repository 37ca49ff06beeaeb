//! Parsing of descriptor text into the element model.

use std::sync::LazyLock;

use regex::Regex;
use roxmltree::Node;

use super::utils::{
    element_children, get_tag_name, leaf_text, namespace_declarations, qualified_attributes,
};
use crate::config::MAX_DOCUMENT_SIZE;
use crate::element::{Document, Element, NodeId};
use crate::error::{MergeError, Result};
use crate::grammar::{DocumentFamily, GrammarRegistry};

/// `<!DOCTYPE ...>` declaration, including an internal subset.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DOCTYPE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!DOCTYPE\s[^\[>]*(?:\[.*?\]\s*)?>").expect("valid regex")
});

/// Parse a descriptor document.
///
/// The family is taken from `family` when given and otherwise detected from
/// the root element. Every element is resolved through the family grammar,
/// so a strict family rejects undeclared tags here already.
///
/// Comments and processing instructions are dropped. Text is kept for leaf
/// elements only, trimmed. The `<!DOCTYPE>` declaration is kept verbatim.
///
/// # Errors
/// Returns `DocumentTooLarge`, `XmlParse`, `UnknownFamily`,
/// `UnknownDocumentType` or `UnknownTag`.
///
/// # Examples
/// ```
/// use descriptor_merge::grammar::create_default_grammar;
/// use descriptor_merge::xml::parse_document;
///
/// let grammar = create_default_grammar();
/// let xml = "<web-app><display-name>Shop</display-name></web-app>";
/// let document = parse_document(xml, &grammar, None).unwrap();
///
/// assert_eq!(document.family(), "web-app");
/// assert_eq!(document.root_element().text_at("display-name"), Some("Shop"));
/// ```
pub fn parse_document(
    text: &str,
    grammar: &GrammarRegistry,
    family: Option<&str>,
) -> Result<Document> {
    if text.len() > MAX_DOCUMENT_SIZE {
        return Err(MergeError::DocumentTooLarge {
            size: text.len(),
            max: MAX_DOCUMENT_SIZE,
        });
    }

    let mut options = roxmltree::ParsingOptions::default();
    options.allow_dtd = true;
    let xml = roxmltree::Document::parse_with_options(text, options)?;
    let root = xml.root_element();
    let root_name = get_tag_name(root);

    let family = match family {
        Some(id) => grammar.family(id)?,
        None => grammar
            .detect_family(root_name)
            .ok_or_else(|| MergeError::UnknownDocumentType {
                root: root_name.to_string(),
            })?,
    };

    let mut document = Document::new(family.resolve_tag(root_name)?);
    let document_root = document.root();
    fill_node(&mut document, document_root, root, family)?;
    // Only the prolog can declare the doctype
    let prolog = &text[..root.range().start];
    document.set_doctype(
        DOCTYPE_PATTERN
            .find(prolog)
            .map(|doctype| doctype.as_str().to_string()),
    );

    tracing::debug!(
        family = %family.id(),
        root = %root_name,
        elements = document.len(),
        "Parsed document"
    );
    Ok(document)
}

/// Parse a detached element of the given family, such as a reference tree.
///
/// # Errors
/// Same as [`parse_document`].
pub fn parse_element(text: &str, grammar: &GrammarRegistry, family: &str) -> Result<Element> {
    Ok(parse_document(text, grammar, Some(family))?.root_element())
}

fn fill_node(
    document: &mut Document,
    id: NodeId,
    node: Node<'_, '_>,
    family: &DocumentFamily,
) -> Result<()> {
    for (name, value) in namespace_declarations(node)
        .into_iter()
        .chain(qualified_attributes(node))
    {
        document.set_attribute(id, name, value);
    }
    document.set_text(id, leaf_text(node));

    let parent_name = get_tag_name(node);
    for child in element_children(node) {
        let tag = family.resolve_child_tag(get_tag_name(child), Some(parent_name))?;
        let child_id = document.create_node(tag);
        document.append_child(id, child_id);
        fill_node(document, child_id, child, family)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{create_default_grammar, UnknownTagPolicy};
    use pretty_assertions::assert_eq;

    const WEB_XML_23: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE web-app PUBLIC "-//Sun Microsystems, Inc.//DTD Web Application 2.3//EN" "http://java.sun.com/dtd/web-app_2_3.dtd">
<web-app>
  <!-- application parameters -->
  <context-param>
    <param-name>debug</param-name>
    <param-value>true</param-value>
  </context-param>
</web-app>
"#;

    #[test]
    fn test_parse_detects_family() {
        let grammar = create_default_grammar();
        let document = parse_document(WEB_XML_23, &grammar, None).unwrap();

        assert_eq!(document.family(), "web-app");
        assert_eq!(document.name(document.root()), "web-app");
        // Comment dropped, one element child
        assert_eq!(document.children(document.root()).len(), 1);
    }

    #[test]
    fn test_parse_keeps_doctype() {
        let grammar = create_default_grammar();
        let document = parse_document(WEB_XML_23, &grammar, None).unwrap();

        assert_eq!(
            document.doctype(),
            Some(
                r#"<!DOCTYPE web-app PUBLIC "-//Sun Microsystems, Inc.//DTD Web Application 2.3//EN" "http://java.sun.com/dtd/web-app_2_3.dtd">"#
            )
        );
    }

    #[test]
    fn test_parse_ignores_doctype_text_in_body() {
        let grammar = create_default_grammar();
        let xml = r#"<web-app>
  <!-- <!DOCTYPE web-app SYSTEM "commented.dtd"> -->
  <description><![CDATA[<!DOCTYPE web-app SYSTEM "cdata.dtd">]]></description>
</web-app>"#;
        let document = parse_document(xml, &grammar, None).unwrap();
        assert!(document.doctype().is_none());
        assert_eq!(
            document.root_element().text_at("description"),
            Some(r#"<!DOCTYPE web-app SYSTEM "cdata.dtd">"#)
        );
    }

    #[test]
    fn test_parse_resolves_grammar_tags() {
        let grammar = create_default_grammar();
        let document = parse_document(WEB_XML_23, &grammar, None).unwrap();
        let param = document.find_child(document.root(), "context-param").unwrap();

        assert_eq!(document.key_value(param), Some("debug".to_string()));
        assert_eq!(document.text(param), None);
    }

    #[test]
    fn test_parse_leaf_text_trimmed() {
        let grammar = create_default_grammar();
        let document = parse_document(WEB_XML_23, &grammar, None).unwrap();
        let value = document
            .find_by_path(document.root(), "context-param/param-value")
            .unwrap();

        assert_eq!(document.text(value), Some("true"));
    }

    #[test]
    fn test_parse_namespaced_descriptor() {
        let grammar = create_default_grammar();
        let xml = r#"<web-app xmlns="http://java.sun.com/xml/ns/j2ee"
            xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
            xsi:schemaLocation="http://java.sun.com/xml/ns/j2ee web-app_2_4.xsd"
            version="2.4"><display-name>Shop</display-name></web-app>"#;

        let document = parse_document(xml, &grammar, None).unwrap();
        let root = document.root();
        assert_eq!(document.family(), "web-app");
        assert_eq!(
            document.attribute(root, "xmlns"),
            Some("http://java.sun.com/xml/ns/j2ee")
        );
        assert_eq!(
            document.attribute(root, "xsi:schemaLocation"),
            Some("http://java.sun.com/xml/ns/j2ee web-app_2_4.xsd")
        );
        assert_eq!(document.attribute(root, "version"), Some("2.4"));
        assert!(document.doctype().is_none());
    }

    #[test]
    fn test_parse_unknown_document_type() {
        let grammar = create_default_grammar();
        let err = parse_document("<ejb-jar/>", &grammar, None).unwrap_err();
        assert!(matches!(err, MergeError::UnknownDocumentType { root } if root == "ejb-jar"));
    }

    #[test]
    fn test_parse_unknown_family() {
        let grammar = create_default_grammar();
        let err = parse_document("<web-app/>", &grammar, Some("ejb-jar")).unwrap_err();
        assert!(matches!(err, MergeError::UnknownFamily(_)));
    }

    #[test]
    fn test_parse_strict_family_rejects_unknown_tag() {
        let grammar = GrammarRegistry::new().with_family(
            DocumentFamily::new("strict", "root")
                .tag("known", true)
                .with_unknown_tags(UnknownTagPolicy::Strict),
        );
        let err = parse_document("<root><known/><other/></root>", &grammar, None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown element <other> for family strict in <root>"
        );
    }

    #[test]
    fn test_parse_invalid_xml() {
        let grammar = create_default_grammar();
        let err = parse_document("<web-app>", &grammar, None).unwrap_err();
        assert!(matches!(err, MergeError::XmlParse(_)));
    }

    #[test]
    fn test_parse_too_large() {
        let grammar = create_default_grammar();
        let text = " ".repeat(MAX_DOCUMENT_SIZE + 1);
        let err = parse_document(&text, &grammar, None).unwrap_err();
        assert!(matches!(err, MergeError::DocumentTooLarge { .. }));
    }

    #[test]
    fn test_parse_element_reference() {
        let grammar = create_default_grammar();
        let reference = parse_element(
            "<context-param><param-name/><param-value>$left:param-value</param-value></context-param>",
            &grammar,
            "web-app",
        )
        .unwrap();

        assert_eq!(reference.name(), "context-param");
        assert!(reference.tag().key().is_some());
        assert_eq!(reference.text_at("param-value"), Some("$left:param-value"));
        assert_eq!(reference.text_at("param-name"), None);
    }
}
