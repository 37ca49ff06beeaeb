//! Tag identities.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// How one element is told apart from its repeatable siblings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagKey {
    /// Value of an attribute on the element.
    Attribute(String),
    /// Trimmed text of child paths (e.g. `"param-name"`), joined with `>`.
    ChildText(Vec<String>),
}

impl TagKey {
    /// Key on an attribute.
    #[must_use]
    pub fn attribute(name: impl Into<String>) -> Self {
        Self::Attribute(name.into())
    }

    /// Key on the text of a single child path.
    #[must_use]
    pub fn child(path: impl Into<String>) -> Self {
        Self::ChildText(vec![path.into()])
    }

    /// Key on the combined text of several child paths.
    #[must_use]
    pub fn children(paths: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::ChildText(paths.into_iter().map(Into::into).collect())
    }

    /// Compute the key value given lookups for attributes and child paths.
    ///
    /// Returns `None` when none of the key parts is present. Missing parts of
    /// a composite key count as empty strings.
    pub fn resolve(
        &self,
        attribute: impl Fn(&str) -> Option<String>,
        child_text: impl Fn(&str) -> Option<String>,
    ) -> Option<String> {
        match self {
            Self::Attribute(name) => attribute(name),
            Self::ChildText(paths) => {
                let parts: Vec<Option<String>> = paths.iter().map(|p| child_text(p)).collect();
                if parts.iter().all(Option::is_none) {
                    return None;
                }
                Some(
                    parts
                        .into_iter()
                        .map(Option::unwrap_or_default)
                        .collect::<Vec<_>>()
                        .join(">"),
                )
            }
        }
    }
}

impl fmt::Display for TagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attribute(name) => write!(f, "@{name}"),
            Self::ChildText(paths) => write!(f, "{}", paths.join(">")),
        }
    }
}

/// Type identity of an element, scoped to a document family.
///
/// Equality and hashing only consider the family and the local name, so a
/// tag resolved twice compares equal even if the copies were built
/// separately.
#[derive(Debug, Clone)]
pub struct Tag {
    family: Arc<str>,
    name: Arc<str>,
    multiple_allowed: bool,
    key: Option<TagKey>,
}

impl Tag {
    /// Create a tag that may repeat and has no key.
    #[must_use]
    pub fn new(family: impl Into<Arc<str>>, name: impl Into<Arc<str>>) -> Self {
        Self {
            family: family.into(),
            name: name.into(),
            multiple_allowed: true,
            key: None,
        }
    }

    /// Set whether several siblings with this tag may coexist.
    #[must_use]
    pub fn with_multiple(mut self, multiple_allowed: bool) -> Self {
        self.multiple_allowed = multiple_allowed;
        self
    }

    /// Set the sibling identity key.
    #[must_use]
    pub fn with_key(mut self, key: TagKey) -> Self {
        self.key = Some(key);
        self
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_multiple_allowed(&self) -> bool {
        self.multiple_allowed
    }

    pub fn key(&self) -> Option<&TagKey> {
        self.key.as_ref()
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.family == other.family && self.name == other.name
    }
}

impl Eq for Tag {}

impl Hash for Tag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.family.hash(state);
        self.name.hash(state);
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
