//! Tag-dispatched merger orchestrating strategies over whole documents.

use std::collections::BTreeMap;

use super::inserter::insert_ordered;
use super::strategy::{MergeContext, MergeStrategy};
use crate::config::MAX_MERGE_DEPTH;
use crate::element::{Document, Element, NodeId};
use crate::error::{MergeError, Result};
use crate::grammar::{DocumentFamily, GrammarRegistry, Tag, TagKey};

/// Merger that resolves conflicts per tag.
///
/// Each tag name may have its own [`MergeStrategy`]; tags without one are
/// handled by the default strategy. With container descent enabled, tags
/// without a strategy for which the grammar declares a child order are
/// merged structurally instead: their attributes are taken over and their
/// children merged one by one.
///
/// Incoming elements are matched against base siblings of the same tag by
/// their tag key, by position for single-valued tags, or by the
/// discriminator attribute of a `ChooseByName` strategy. A strategy result
/// replaces the matched element in place; results without a match are
/// inserted at the position the grammar prescribes.
#[derive(Debug, Clone)]
pub struct DescriptorMerger<'g> {
    grammar: &'g GrammarRegistry,
    default: MergeStrategy,
    strategies: BTreeMap<String, MergeStrategy>,
    descend_containers: bool,
}

impl<'g> DescriptorMerger<'g> {
    /// Create a merger with `Overwrite` as default strategy.
    #[must_use]
    pub fn new(grammar: &'g GrammarRegistry) -> Self {
        Self {
            grammar,
            default: MergeStrategy::Overwrite,
            strategies: BTreeMap::new(),
            descend_containers: false,
        }
    }

    /// Merge containers without an explicit strategy structurally instead of
    /// handing them to the default strategy.
    #[must_use]
    pub fn with_container_descent(mut self, enabled: bool) -> Self {
        self.descend_containers = enabled;
        self
    }

    pub fn set_container_descent(&mut self, enabled: bool) {
        self.descend_containers = enabled;
    }

    pub fn descends_containers(&self) -> bool {
        self.descend_containers
    }

    /// Set the strategy for tags without an explicit one.
    #[must_use]
    pub fn with_default(mut self, strategy: MergeStrategy) -> Self {
        self.default = strategy;
        self
    }

    /// Builder-style [`set_strategy`](Self::set_strategy).
    #[must_use]
    pub fn with_strategy(mut self, tag: impl Into<String>, strategy: MergeStrategy) -> Self {
        self.set_strategy(tag, strategy);
        self
    }

    /// Register the strategy for a tag name, replacing any previous one.
    pub fn set_strategy(&mut self, tag: impl Into<String>, strategy: MergeStrategy) {
        self.strategies.insert(tag.into(), strategy);
    }

    pub fn set_default(&mut self, strategy: MergeStrategy) {
        self.default = strategy;
    }

    pub fn grammar(&self) -> &'g GrammarRegistry {
        self.grammar
    }

    /// Explicitly registered strategy for a tag name.
    pub fn explicit_strategy(&self, tag: &str) -> Option<&MergeStrategy> {
        self.strategies.get(tag)
    }

    /// Strategy applied to a tag name: the registered one or the default.
    pub fn strategy_for(&self, tag: &str) -> &MergeStrategy {
        self.strategies.get(tag).unwrap_or(&self.default)
    }

    /// Merge overlays into `base`, left to right, and return the result.
    ///
    /// # Errors
    /// Fails on the first overlay that cannot be merged; the partially
    /// merged document is dropped.
    pub fn merge_into(&self, mut base: Document, overlays: &[Document]) -> Result<Document> {
        for overlay in overlays {
            self.merge_overlay(&mut base, overlay)?;
        }
        Ok(base)
    }

    /// Merge a single overlay into `base`.
    ///
    /// Without a strategy for the root tag, the children of the root are
    /// merged tag by tag. The root keeps the base attributes unless container
    /// descent is enabled.
    ///
    /// # Errors
    /// Returns `FamilyMismatch` or `RootMismatch` when the overlay does not
    /// describe the same kind of document, and any error raised by a
    /// strategy or by the multiplicity check.
    pub fn merge_overlay(&self, base: &mut Document, overlay: &Document) -> Result<()> {
        if overlay.family() != base.family() {
            return Err(MergeError::FamilyMismatch {
                expected: base.family().to_string(),
                found: overlay.family().to_string(),
            });
        }
        let root_name = base.name(base.root()).to_string();
        if overlay.name(overlay.root()) != root_name {
            return Err(MergeError::RootMismatch {
                expected: root_name,
                found: overlay.name(overlay.root()).to_string(),
            });
        }
        let family = self.grammar.family(base.family())?;

        tracing::info!(
            family = %family.id(),
            root = %root_name,
            elements = overlay.len(),
            "Merging overlay"
        );

        match self.strategies.get(&root_name) {
            Some(MergeStrategy::Xslt(xslt)) => {
                tracing::debug!(program = %xslt.program(), "Transforming whole document");
                *base = xslt.apply(family, base, overlay)?;
            }
            Some(strategy) => {
                let ctx = MergeContext::new(family);
                let result = strategy.merge(
                    &ctx,
                    Some(&base.root_element()),
                    &overlay.root_element(),
                )?;
                let root = single_root(family, &root_name, result)?;
                base.replace_root(&root);
            }
            None => {
                let base_root = base.root();
                if self.descend_containers {
                    copy_attributes(base, base_root, overlay, overlay.root());
                }
                self.merge_children(base, base_root, overlay, overlay.root(), family, 0)?;
            }
        }
        Ok(())
    }

    /// Merge the children of `incoming_parent` into `base_parent`.
    fn merge_children(
        &self,
        base: &mut Document,
        base_parent: NodeId,
        overlay: &Document,
        incoming_parent: NodeId,
        family: &DocumentFamily,
        depth: usize,
    ) -> Result<()> {
        if depth >= MAX_MERGE_DEPTH {
            return Err(MergeError::NestingTooDeep {
                tag: base.name(base_parent).to_string(),
                max: MAX_MERGE_DEPTH,
            });
        }

        // Group incoming children by tag, in order of first appearance
        let mut groups: Vec<(&str, Vec<NodeId>)> = Vec::new();
        for &child in overlay.children(incoming_parent) {
            let name = overlay.name(child);
            match groups.iter_mut().find(|(group, _)| *group == name) {
                Some((_, members)) => members.push(child),
                None => groups.push((name, vec![child])),
            }
        }

        let parent_name = base.name(base_parent).to_string();
        for (name, members) in groups {
            let tag = family.resolve_child_tag(name, Some(&parent_name))?;
            let strategy = self.strategies.get(name);

            for incoming in members {
                let matched = find_match(base, base_parent, overlay, incoming, &tag, strategy);
                match strategy {
                    Some(strategy) => self.apply_strategy(
                        strategy, base, base_parent, matched, overlay, incoming, family, &tag,
                    )?,
                    None if self.descend_containers && family.is_container(name) => {
                        self.descend(base, base_parent, matched, overlay, incoming, family, depth)?;
                    }
                    None => self.apply_strategy(
                        &self.default,
                        base,
                        base_parent,
                        matched,
                        overlay,
                        incoming,
                        family,
                        &tag,
                    )?,
                }
            }

            check_multiplicity(family, &tag, base.find_children(base_parent, name).len())?;
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn apply_strategy(
        &self,
        strategy: &MergeStrategy,
        base: &mut Document,
        base_parent: NodeId,
        matched: Option<NodeId>,
        overlay: &Document,
        incoming: NodeId,
        family: &DocumentFamily,
        tag: &Tag,
    ) -> Result<()> {
        let ctx = MergeContext::new(family);
        let base_element = matched.map(|id| base.to_element(id));
        let incoming_element = overlay.to_element(incoming);
        let result = strategy.merge(&ctx, base_element.as_ref(), &incoming_element)?;

        tracing::debug!(
            tag = %tag,
            strategy = strategy.name(),
            matched = matched.is_some(),
            results = result.len(),
            "Applied merge strategy"
        );

        check_multiplicity(family, tag, result.len())?;

        let grafted: Vec<NodeId> = result.iter().map(|element| base.graft(element)).collect();
        match matched {
            Some(old) => {
                base.replace_child(base_parent, old, &grafted);
            }
            None => {
                for id in grafted {
                    insert_ordered(base, base_parent, id, family)?;
                }
            }
        }
        Ok(())
    }

    /// Merge a container structurally: match it, take over its attributes
    /// and merge its children. An unmatched container is adopted whole.
    #[allow(clippy::too_many_arguments)]
    fn descend(
        &self,
        base: &mut Document,
        base_parent: NodeId,
        matched: Option<NodeId>,
        overlay: &Document,
        incoming: NodeId,
        family: &DocumentFamily,
        depth: usize,
    ) -> Result<()> {
        match matched {
            Some(target) => {
                tracing::debug!(tag = %base.name(target), depth, "Descending into container");
                copy_attributes(base, target, overlay, incoming);
                if let Some(text) = overlay.text(incoming) {
                    base.set_text(target, Some(text.to_string()));
                }
                self.merge_children(base, target, overlay, incoming, family, depth + 1)
            }
            None => {
                let id = base.graft(&overlay.to_element(incoming));
                insert_ordered(base, base_parent, id, family)?;
                Ok(())
            }
        }
    }
}

fn constraint_violation(family: &DocumentFamily, tag: &str, count: usize) -> MergeError {
    MergeError::DescriptorConstraintViolation {
        family: family.id().to_string(),
        tag: tag.to_string(),
        count,
    }
}

/// A root strategy must produce exactly one element.
fn single_root(
    family: &DocumentFamily,
    root_name: &str,
    mut result: Vec<Element>,
) -> Result<Element> {
    if result.len() != 1 {
        return Err(constraint_violation(family, root_name, result.len()));
    }
    Ok(result.remove(0))
}

/// A single-valued tag may occur at most once.
fn check_multiplicity(family: &DocumentFamily, tag: &Tag, count: usize) -> Result<()> {
    if !tag.is_multiple_allowed() && count > 1 {
        return Err(constraint_violation(family, tag.name(), count));
    }
    Ok(())
}

fn copy_attributes(base: &mut Document, target: NodeId, overlay: &Document, source: NodeId) {
    for (name, value) in overlay.attributes(source) {
        base.set_attribute(target, name.clone(), value.clone());
    }
}

/// Key value of a node computed with the grammar's key for its tag.
fn key_of(document: &Document, id: NodeId, key: &TagKey) -> Option<String> {
    key.resolve(
        |attr| document.attribute(id, attr).map(str::to_string),
        |path| {
            document
                .find_by_path(id, path)
                .and_then(|node| document.text(node))
                .map(|text| text.trim().to_string())
        },
    )
}

/// Find the base sibling an incoming node merges with.
fn find_match(
    base: &Document,
    base_parent: NodeId,
    overlay: &Document,
    incoming: NodeId,
    tag: &Tag,
    strategy: Option<&MergeStrategy>,
) -> Option<NodeId> {
    let candidates = base.find_children(base_parent, tag.name());

    if let Some(key) = tag.key() {
        let value = key_of(overlay, incoming, key)?;
        return candidates
            .into_iter()
            .find(|&candidate| key_of(base, candidate, key).as_deref() == Some(value.as_str()));
    }

    if !tag.is_multiple_allowed() {
        return candidates.first().copied();
    }

    if let Some(MergeStrategy::ChooseByName(choose)) = strategy {
        let value = overlay.attribute(incoming, choose.discriminator())?;
        return candidates
            .into_iter()
            .find(|&candidate| base.attribute(candidate, choose.discriminator()) == Some(value));
    }

    None
}
