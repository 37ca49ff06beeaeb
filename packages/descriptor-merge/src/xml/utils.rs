//! XML utility functions for reading roxmltree nodes.

use roxmltree::Node;

/// Get the tag name without namespace prefix.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use descriptor_merge::xml::get_tag_name;
///
/// let xml = r#"<j2ee:web-app xmlns:j2ee="http://java.sun.com/xml/ns/j2ee"/>"#;
/// let doc = Document::parse(xml).unwrap();
/// assert_eq!(get_tag_name(doc.root_element()), "web-app");
/// ```
pub fn get_tag_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Get all element children of a node.
///
/// Text nodes, comments and processing instructions are skipped.
pub fn element_children<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|child| child.is_element())
}

/// Get the trimmed text of a leaf element.
///
/// All text children are concatenated, so text split by comments or CDATA
/// sections is read whole. Returns `None` for elements with element
/// children and for text that is empty after trimming.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use descriptor_merge::xml::leaf_text;
///
/// let doc = Document::parse("<a>  value  </a>").unwrap();
/// assert_eq!(leaf_text(doc.root_element()), Some("value".to_string()));
///
/// let doc = Document::parse("<a>text<b/></a>").unwrap();
/// assert_eq!(leaf_text(doc.root_element()), None);
/// ```
pub fn leaf_text(node: Node<'_, '_>) -> Option<String> {
    if element_children(node).next().is_some() {
        return None;
    }
    let text: String = node
        .children()
        .filter(|child| child.is_text())
        .filter_map(|child| child.text())
        .collect();
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Get the attributes of a node with their prefixed names.
///
/// Attributes in a namespace keep the prefix they were written with
/// (e.g. `xsi:schemaLocation`).
pub fn qualified_attributes(node: Node<'_, '_>) -> Vec<(String, String)> {
    node.attributes()
        .map(|attr| {
            let prefix = attr
                .namespace()
                .and_then(|uri| node.lookup_prefix(uri))
                .filter(|prefix| !prefix.is_empty());
            let name = match prefix {
                Some(prefix) => format!("{prefix}:{}", attr.name()),
                None => attr.name().to_string(),
            };
            (name, attr.value().to_string())
        })
        .collect()
}

/// Get the namespace declarations introduced by a node as attributes.
///
/// Declarations already in scope on the parent element are left out, so
/// each declaration is reported once, on the element that made it.
pub fn namespace_declarations(node: Node<'_, '_>) -> Vec<(String, String)> {
    let inherited: Vec<(Option<&str>, &str)> = node
        .parent_element()
        .map(|parent| parent.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
        .unwrap_or_default();

    node.namespaces()
        .filter(|ns| ns.name() != Some("xml"))
        .filter(|ns| !inherited.contains(&(ns.name(), ns.uri())))
        .map(|ns| match ns.name() {
            Some(prefix) => (format!("xmlns:{prefix}"), ns.uri().to_string()),
            None => ("xmlns".to_string(), ns.uri().to_string()),
        })
        .collect()
}
