//! Arena-backed document tree.

use std::collections::BTreeMap;

use super::fragment::Element;
use crate::error::{MergeError, Result};
use crate::grammar::Tag;

/// Index of a node inside one [`Document`].
///
/// Ids are only meaningful for the document that created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct NodeData {
    tag: Tag,
    attributes: BTreeMap<String, String>,
    children: Vec<NodeId>,
    text: Option<String>,
    parent: Option<NodeId>,
}

impl NodeData {
    fn new(tag: Tag) -> Self {
        Self {
            tag,
            attributes: BTreeMap::new(),
            children: Vec::new(),
            text: None,
            parent: None,
        }
    }
}

/// A descriptor document: a root node plus the family governing it.
///
/// Nodes live in an arena and are never freed; a detached node simply
/// stops being reachable from the root.
#[derive(Debug, Clone)]
pub struct Document {
    family: String,
    doctype: Option<String>,
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl Document {
    /// Create a document with an empty root element.
    ///
    /// The document family is the family of the root tag.
    #[must_use]
    pub fn new(root_tag: Tag) -> Self {
        Self {
            family: root_tag.family().to_string(),
            doctype: None,
            nodes: vec![NodeData::new(root_tag)],
            root: NodeId(0),
        }
    }

    /// Build a document from an owned element tree.
    #[must_use]
    pub fn from_element(root: &Element) -> Self {
        let mut document = Self::new(root.tag().clone());
        let root_id = document.root;
        document.copy_into(root_id, root);
        document
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    /// The `<!DOCTYPE ...>` declaration carried over from the source text.
    pub fn doctype(&self) -> Option<&str> {
        self.doctype.as_deref()
    }

    pub fn set_doctype(&mut self, doctype: Option<String>) {
        self.doctype = doctype;
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Replace the whole tree with a copy of `root`.
    pub fn replace_root(&mut self, root: &Element) {
        let id = self.graft(root);
        self.root = id;
    }

    /// Create a detached node.
    pub fn create_node(&mut self, tag: Tag) -> NodeId {
        self.nodes.push(NodeData::new(tag));
        NodeId(self.nodes.len() - 1)
    }

    fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0]
    }

    pub fn tag(&self, id: NodeId) -> &Tag {
        &self.node(id).tag
    }

    /// Local tag name of a node.
    pub fn name(&self, id: NodeId) -> &str {
        self.node(id).tag.name()
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id).attributes.get(name).map(String::as_str)
    }

    pub fn attributes(&self, id: NodeId) -> &BTreeMap<String, String> {
        &self.node(id).attributes
    }

    pub fn set_attribute(&mut self, id: NodeId, name: impl Into<String>, value: impl Into<String>) {
        self.node_mut(id).attributes.insert(name.into(), value.into());
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Option<String> {
        self.node_mut(id).attributes.remove(name)
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.node(id).text.as_deref()
    }

    pub fn set_text(&mut self, id: NodeId, text: Option<String>) {
        self.node_mut(id).text = text;
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Position of `child` among the children of `parent`.
    pub fn index_of(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.children(parent).iter().position(|&c| c == child)
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == candidate {
                return true;
            }
            match self.parent(node) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    /// Detach a node from its parent, if it has one.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.node(id).parent {
            self.node_mut(parent).children.retain(|&c| c != id);
            self.node_mut(id).parent = None;
        }
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(
            !self.is_ancestor_or_self(child, parent),
            "appending a node below itself would create a cycle"
        );
        self.detach(child);
        self.node_mut(parent).children.push(child);
        self.node_mut(child).parent = Some(parent);
    }

    /// Insert `child` at `index` among the children of `parent`.
    ///
    /// The child is detached first, so `index` refers to the child list
    /// without it.
    ///
    /// # Errors
    /// Returns `IndexOutOfRange` when `index` is past the end of the list.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<()> {
        debug_assert!(
            !self.is_ancestor_or_self(child, parent),
            "inserting a node below itself would create a cycle"
        );
        self.detach(child);
        let len = self.children(parent).len();
        if index > len {
            return Err(MergeError::IndexOutOfRange { index, len });
        }
        self.node_mut(parent).children.insert(index, child);
        self.node_mut(child).parent = Some(parent);
        Ok(())
    }

    /// Remove `child` from `parent`. Returns `false` if it was not a child.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if self.node(child).parent != Some(parent) {
            return false;
        }
        self.detach(child);
        true
    }

    /// Replace `old` with `replacements`, keeping its position.
    ///
    /// Returns the index `old` occupied, or `None` when `old` is not a child
    /// of `parent` (nothing is changed then).
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        old: NodeId,
        replacements: &[NodeId],
    ) -> Option<usize> {
        let index = self.index_of(parent, old)?;
        self.detach(old);
        for &replacement in replacements {
            self.detach(replacement);
        }
        let children = &mut self.node_mut(parent).children;
        let tail = children.split_off(index);
        children.extend_from_slice(replacements);
        children.extend(tail);
        for &replacement in replacements {
            self.node_mut(replacement).parent = Some(parent);
        }
        Some(index)
    }

    /// Copy an owned element tree into the arena as a detached subtree.
    pub fn graft(&mut self, element: &Element) -> NodeId {
        let id = self.create_node(element.tag().clone());
        self.copy_into(id, element);
        id
    }

    fn copy_into(&mut self, id: NodeId, element: &Element) {
        {
            let node = self.node_mut(id);
            node.attributes = element.attributes().clone();
            node.text = element.text().map(str::to_string);
        }
        for child in element.children() {
            let child_id = self.graft(child);
            self.append_child(id, child_id);
        }
    }

    /// Copy a subtree out of the arena.
    #[must_use]
    pub fn to_element(&self, id: NodeId) -> Element {
        let node = self.node(id);
        let mut element = Element::new(node.tag.clone());
        for (name, value) in &node.attributes {
            element.set_attribute(name.clone(), value.clone());
        }
        element.set_text(node.text.clone());
        for &child in &node.children {
            element.push_child(self.to_element(child));
        }
        element
    }

    /// Copy of the whole tree from the root.
    #[must_use]
    pub fn root_element(&self) -> Element {
        self.to_element(self.root)
    }

    /// First child of `id` with the given tag name.
    pub fn find_child(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&child| self.name(child) == name)
    }

    /// All children of `id` with the given tag name, in document order.
    pub fn find_children(&self, id: NodeId, name: &str) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&child| self.name(child) == name)
            .collect()
    }

    /// Descendant of `id` matching a slash-separated path of tag names.
    pub fn find_by_path(&self, id: NodeId, path: &str) -> Option<NodeId> {
        let mut current = id;
        for part in path.split('/').filter(|p| !p.is_empty()) {
            current = self.find_child(current, part)?;
        }
        Some(current)
    }

    /// Identity value of a node according to its tag key.
    pub fn key_value(&self, id: NodeId) -> Option<String> {
        let key = self.tag(id).key()?;
        key.resolve(
            |attr| self.attribute(id, attr).map(str::to_string),
            |path| {
                self.find_by_path(id, path)
                    .and_then(|node| self.text(node))
                    .map(|text| text.trim().to_string())
            },
        )
    }

    /// Number of nodes reachable from the root.
    pub fn len(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            count += 1;
            stack.extend_from_slice(self.children(id));
        }
        count
    }

    /// A document always has at least its root.
    pub fn is_empty(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::TagKey;
    use pretty_assertions::assert_eq;

    fn tag(name: &str) -> Tag {
        Tag::new("test", name)
    }

    fn names(document: &Document, id: NodeId) -> Vec<String> {
        document
            .children(id)
            .iter()
            .map(|&c| document.name(c).to_string())
            .collect()
    }

    #[test]
    fn test_new_document_family_from_root_tag() {
        let document = Document::new(tag("root"));
        assert_eq!(document.family(), "test");
        assert_eq!(document.name(document.root()), "root");
        assert_eq!(document.len(), 1);
    }

    #[test]
    fn test_append_and_insert() {
        let mut document = Document::new(tag("root"));
        let root = document.root();
        let a = document.create_node(tag("a"));
        let c = document.create_node(tag("c"));
        let b = document.create_node(tag("b"));

        document.append_child(root, a);
        document.append_child(root, c);
        document.insert_child(root, 1, b).unwrap();

        assert_eq!(names(&document, root), vec!["a", "b", "c"]);
        assert_eq!(document.parent(b), Some(root));
    }

    #[test]
    fn test_insert_out_of_range() {
        let mut document = Document::new(tag("root"));
        let root = document.root();
        let a = document.create_node(tag("a"));

        let err = document.insert_child(root, 3, a).unwrap_err();
        assert!(matches!(
            err,
            MergeError::IndexOutOfRange { index: 3, len: 0 }
        ));
    }

    #[test]
    fn test_remove_child() {
        let mut document = Document::new(tag("root"));
        let root = document.root();
        let a = document.create_node(tag("a"));
        document.append_child(root, a);

        assert!(document.remove_child(root, a));
        assert!(!document.remove_child(root, a));
        assert!(document.children(root).is_empty());
        assert_eq!(document.parent(a), None);
    }

    #[test]
    fn test_replace_child_keeps_position() {
        let mut document = Document::new(tag("root"));
        let root = document.root();
        for name in ["a", "b", "c"] {
            let id = document.create_node(tag(name));
            document.append_child(root, id);
        }
        let b = document.find_child(root, "b").unwrap();
        let x = document.create_node(tag("x"));
        let y = document.create_node(tag("y"));

        assert_eq!(document.replace_child(root, b, &[x, y]), Some(1));
        assert_eq!(names(&document, root), vec!["a", "x", "y", "c"]);
    }

    #[test]
    fn test_attributes_absent_vs_empty() {
        let mut document = Document::new(tag("root"));
        let root = document.root();
        document.set_attribute(root, "empty", "");

        assert_eq!(document.attribute(root, "empty"), Some(""));
        assert_eq!(document.attribute(root, "missing"), None);
        assert_eq!(document.remove_attribute(root, "empty"), Some(String::new()));
    }

    #[test]
    fn test_graft_and_to_element_roundtrip() {
        let element = Element::new(tag("servlet"))
            .with_attribute("id", "s1")
            .with_child(Element::new(tag("servlet-name")).with_text("main"));

        let document = Document::from_element(&element);
        assert_eq!(document.root_element(), element);
        assert_eq!(document.len(), 2);
    }

    #[test]
    fn test_key_value_from_path() {
        let keyed = Tag::new("test", "servlet").with_key(TagKey::child("servlet-name"));
        let element =
            Element::new(keyed).with_child(Element::new(tag("servlet-name")).with_text("main"));
        let document = Document::from_element(&element);

        assert_eq!(document.key_value(document.root()), Some("main".to_string()));
    }

    #[test]
    fn test_detached_nodes_are_not_counted() {
        let mut document = Document::new(tag("root"));
        let root = document.root();
        let a = document.create_node(tag("a"));
        document.append_child(root, a);
        document.detach(a);

        assert_eq!(document.len(), 1);
    }
}
