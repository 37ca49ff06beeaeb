//! Owned element subtrees.

use std::collections::BTreeMap;

use crate::grammar::Tag;

/// A detached element with its attributes, children and text.
///
/// Attributes are kept sorted by name; their insertion order carries no
/// meaning and sorting keeps serialized output deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: Tag,
    attributes: BTreeMap<String, String>,
    children: Vec<Element>,
    text: Option<String>,
}

impl Element {
    /// Create an empty element for a tag.
    #[must_use]
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            attributes: BTreeMap::new(),
            children: Vec::new(),
            text: None,
        }
    }

    /// Set an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Append a child.
    #[must_use]
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Append several children.
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }

    /// Set the text content.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    /// Local name of the element's tag.
    pub fn name(&self) -> &str {
        self.tag.name()
    }

    /// Get an attribute value. An empty value is returned as `Some("")`.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        self.attributes.remove(name)
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn set_text(&mut self, text: Option<String>) {
        self.text = text;
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Element> {
        &mut self.children
    }

    pub fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Find the first child with the given tag name.
    pub fn find_child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name() == name)
    }

    /// Find all children with the given tag name.
    pub fn find_children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |child| child.name() == name)
    }

    /// Find a descendant matching a slash-separated path of tag names.
    ///
    /// ```
    /// use descriptor_merge::element::Element;
    /// use descriptor_merge::grammar::Tag;
    ///
    /// let tag = |name: &str| Tag::new("web-app", name);
    /// let servlet = Element::new(tag("servlet")).with_child(
    ///     Element::new(tag("init-param"))
    ///         .with_child(Element::new(tag("param-name")).with_text("debug")),
    /// );
    /// let name = servlet.find_by_path("init-param/param-name").unwrap();
    /// assert_eq!(name.text(), Some("debug"));
    /// ```
    pub fn find_by_path(&self, path: &str) -> Option<&Element> {
        let mut current = self;
        for part in path.split('/').filter(|p| !p.is_empty()) {
            current = current.find_child(part)?;
        }
        Some(current)
    }

    /// Trimmed text at a child path, if the path exists and carries text.
    pub fn text_at(&self, path: &str) -> Option<&str> {
        self.find_by_path(path)
            .and_then(Element::text)
            .map(str::trim)
    }

    /// Identity value of this element according to its tag key.
    pub fn key_value(&self) -> Option<String> {
        let key = self.tag.key()?;
        key.resolve(
            |attr| self.attribute(attr).map(str::to_string),
            |path| self.text_at(path).map(str::to_string),
        )
    }

    /// Total number of elements in this subtree, including itself.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Element::subtree_len).sum::<usize>()
    }
}
