//! Document families: the tags of one descriptor format and their order.

use std::collections::HashMap;
use std::sync::Arc;

use super::tag::{Tag, TagKey};
use crate::error::{MergeError, Result};

/// What to do with a tag a family does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownTagPolicy {
    /// Resolve to an ad-hoc tag that may repeat, has no key and no order.
    #[default]
    Permissive,
    /// Fail with `UnknownTag`.
    Strict,
}

/// Grammar of one descriptor format.
///
/// Declares which tags exist, whether they may repeat, how repeatable
/// siblings are identified and, for container tags, the canonical order of
/// their children.
#[derive(Debug, Clone)]
pub struct DocumentFamily {
    id: Arc<str>,
    root: String,
    tags: HashMap<String, Tag>,
    declared: Vec<String>,
    orders: HashMap<String, Vec<String>>,
    unknown_tags: UnknownTagPolicy,
}

impl DocumentFamily {
    /// Create a family whose documents have the given root element.
    #[must_use]
    pub fn new(id: impl Into<String>, root: impl Into<String>) -> Self {
        let id: Arc<str> = Arc::from(id.into());
        let root = root.into();
        let family = Self {
            id,
            root: root.clone(),
            tags: HashMap::new(),
            declared: Vec::new(),
            orders: HashMap::new(),
            unknown_tags: UnknownTagPolicy::default(),
        };
        family.tag(root, false)
    }

    fn declare(mut self, tag: Tag) -> Self {
        let name = tag.name().to_string();
        if !self.tags.contains_key(&name) {
            self.declared.push(name.clone());
        }
        self.tags.insert(name, tag);
        self
    }

    /// Declare a tag without a key.
    #[must_use]
    pub fn tag(self, name: impl Into<String>, multiple_allowed: bool) -> Self {
        let tag = Tag::new(Arc::clone(&self.id), name.into()).with_multiple(multiple_allowed);
        self.declare(tag)
    }

    /// Declare a repeatable tag whose siblings are identified by `key`.
    #[must_use]
    pub fn keyed_tag(self, name: impl Into<String>, key: TagKey) -> Self {
        let tag = Tag::new(Arc::clone(&self.id), name.into())
            .with_multiple(true)
            .with_key(key);
        self.declare(tag)
    }

    /// Declare the canonical order of the children of `parent`.
    #[must_use]
    pub fn order(
        mut self,
        parent: impl Into<String>,
        children: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.orders.insert(
            parent.into(),
            children.into_iter().map(Into::into).collect(),
        );
        self
    }

    /// Set the unknown tag policy.
    #[must_use]
    pub fn with_unknown_tags(mut self, policy: UnknownTagPolicy) -> Self {
        self.unknown_tags = policy;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Local name of the root element of this family's documents.
    pub fn root_name(&self) -> &str {
        &self.root
    }

    pub fn unknown_tag_policy(&self) -> UnknownTagPolicy {
        self.unknown_tags
    }

    /// Declared tag for a local name, without applying the unknown policy.
    pub fn declared_tag(&self, name: &str) -> Option<&Tag> {
        self.tags.get(name)
    }

    /// Declared tags in declaration order.
    pub fn tags(&self) -> impl Iterator<Item = &Tag> {
        self.declared.iter().filter_map(|name| self.tags.get(name))
    }

    /// Resolve a local name to a tag.
    ///
    /// # Errors
    /// Returns `UnknownTag` for undeclared names under the strict policy.
    pub fn resolve_tag(&self, name: &str) -> Result<Tag> {
        self.resolve_child_tag(name, None)
    }

    /// Resolve a local name found under `parent`, which is reported in the
    /// error when the name is rejected.
    ///
    /// # Errors
    /// Returns `UnknownTag` for undeclared names under the strict policy.
    pub fn resolve_child_tag(&self, name: &str, parent: Option<&str>) -> Result<Tag> {
        if let Some(tag) = self.tags.get(name) {
            return Ok(tag.clone());
        }
        match self.unknown_tags {
            UnknownTagPolicy::Permissive => Ok(Tag::new(Arc::clone(&self.id), name)),
            UnknownTagPolicy::Strict => Err(MergeError::UnknownTag {
                family: self.id.to_string(),
                tag_name: name.to_string(),
                context: parent.map(|p| format!("<{p}>")),
            }),
        }
    }

    /// Canonical child order under `parent`, if declared.
    pub fn order_of(&self, parent: &str) -> Option<&[String]> {
        self.orders.get(parent).map(Vec::as_slice)
    }

    /// Rank of `child` under `parent`; `None` when unordered or unlisted.
    pub fn rank(&self, parent: &str, child: &str) -> Option<usize> {
        self.order_of(parent)?.iter().position(|name| name == child)
    }

    /// Whether `name` declares a child order, i.e. is merged structurally.
    pub fn is_container(&self, name: &str) -> bool {
        self.orders.contains_key(name)
    }
}
