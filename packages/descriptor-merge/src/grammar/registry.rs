//! Registry of document families.

use std::collections::BTreeMap;

use super::family::DocumentFamily;
use super::tag::Tag;
use crate::error::{MergeError, Result};

/// Registry mapping family ids to their grammar.
///
/// Passed explicitly to the parser, the merger and the configuration
/// loader; there is no global grammar state.
#[derive(Debug, Clone, Default)]
pub struct GrammarRegistry {
    families: BTreeMap<String, DocumentFamily>,
}

impl GrammarRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a family, replacing any family with the same id.
    pub fn register(&mut self, family: DocumentFamily) {
        self.families.insert(family.id().to_string(), family);
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with_family(mut self, family: DocumentFamily) -> Self {
        self.register(family);
        self
    }

    /// Get a family by id.
    ///
    /// # Errors
    /// Returns `UnknownFamily` if no family has this id.
    pub fn family(&self, id: &str) -> Result<&DocumentFamily> {
        self.families
            .get(id)
            .ok_or_else(|| MergeError::UnknownFamily(id.to_string()))
    }

    /// Check if a family is registered.
    #[must_use]
    pub fn has_family(&self, id: &str) -> bool {
        self.families.contains_key(id)
    }

    /// Registered families, ordered by id.
    pub fn families(&self) -> impl Iterator<Item = &DocumentFamily> {
        self.families.values()
    }

    /// Resolve a local name within a family.
    ///
    /// # Errors
    /// Returns `UnknownFamily`, or `UnknownTag` under a strict family.
    pub fn resolve_tag(&self, family_id: &str, name: &str) -> Result<Tag> {
        self.family(family_id)?.resolve_tag(name)
    }

    /// Canonical child order under `parent` in a family.
    pub fn order_of(&self, family_id: &str, parent: &str) -> Option<&[String]> {
        self.families.get(family_id)?.order_of(parent)
    }

    /// Find the family whose documents start with this root element.
    ///
    /// Families are checked in id order; the first match wins.
    pub fn detect_family(&self, root_name: &str) -> Option<&DocumentFamily> {
        self.families
            .values()
            .find(|family| family.root_name() == root_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> GrammarRegistry {
        GrammarRegistry::new()
            .with_family(DocumentFamily::new("alpha", "a-root").order("a-root", ["x", "y"]))
            .with_family(DocumentFamily::new("beta", "b-root"))
    }

    #[test]
    fn test_registry_family_lookup() {
        let registry = registry();
        assert!(registry.family("alpha").is_ok());
        assert!(registry.has_family("beta"));
        assert!(matches!(
            registry.family("gamma"),
            Err(MergeError::UnknownFamily(id)) if id == "gamma"
        ));
    }

    #[test]
    fn test_registry_resolve_tag() {
        let registry = registry();
        let tag = registry.resolve_tag("alpha", "x").unwrap();
        assert_eq!(tag.family(), "alpha");
        assert_eq!(tag.name(), "x");
    }

    #[test]
    fn test_registry_order_of() {
        let registry = registry();
        assert_eq!(
            registry.order_of("alpha", "a-root"),
            Some(&["x".to_string(), "y".to_string()][..])
        );
        assert!(registry.order_of("beta", "b-root").is_none());
        assert!(registry.order_of("gamma", "a-root").is_none());
    }

    #[test]
    fn test_registry_detect_family() {
        let registry = registry();
        assert_eq!(registry.detect_family("b-root").map(|f| f.id()), Some("beta"));
        assert!(registry.detect_family("unknown").is_none());
    }
}
