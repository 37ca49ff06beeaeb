//! Reference-tree driven merging of two elements.

use regex::Captures;

use super::inserter::order_children;
use super::strategy::MergeContext;
use crate::config::TEMPLATE_PLACEHOLDER;
use crate::element::Element;
use crate::error::Result;
use crate::grammar::DocumentFamily;

/// What to do with the children of one tag, compiled from a reference child.
#[derive(Debug, Clone)]
enum Rule {
    /// Emit one child whose text is the template with placeholders filled.
    Template(String),
    /// Pair base and incoming children and merge them with a nested reference.
    Nested(Box<NodeMergeStrategy>),
    /// Keep base children, adopting incoming ones only when there are none.
    Keep,
}

/// Merge strategy combining base and incoming along a reference tree.
///
/// Each child of the reference element stands for the children of the same
/// tag in the merged element:
///
/// - a leaf with `$left:path` / `$right:path` placeholders is a template,
///   filled with the trimmed text at `path` under the base (`left`) and
///   incoming (`right`) element;
/// - a child with element children is merged recursively;
/// - an empty leaf keeps the base children.
///
/// Tags the reference does not mention are overwritten by incoming children
/// when there are any.
///
/// ```
/// use descriptor_merge::element::Element;
/// use descriptor_merge::grammar::create_web_app_family;
/// use descriptor_merge::merge::{MergeContext, NodeMergeStrategy};
///
/// let family = create_web_app_family();
/// let tag = |name: &str| family.resolve_tag(name).unwrap();
/// let param = |value: &str| {
///     Element::new(tag("context-param"))
///         .with_child(Element::new(tag("param-name")).with_text("param"))
///         .with_child(Element::new(tag("param-value")).with_text(value))
/// };
/// let reference = Element::new(tag("context-param"))
///     .with_child(Element::new(tag("param-name")).with_text("$left:param-name"))
///     .with_child(
///         Element::new(tag("param-value"))
///             .with_text("$left:param-value $right:param-value"),
///     );
///
/// let strategy = NodeMergeStrategy::new(reference);
/// let merged = strategy
///     .merge(&MergeContext::new(&family), Some(&param("value1")), &param("value2"))
///     .unwrap();
/// assert_eq!(merged[0].text_at("param-value"), Some("value1 value2"));
/// ```
#[derive(Debug, Clone)]
pub struct NodeMergeStrategy {
    reference: Element,
    text_template: Option<String>,
    rules: Vec<(String, Rule)>,
}

fn has_placeholder(text: &str) -> bool {
    TEMPLATE_PLACEHOLDER.is_match(text)
}

impl NodeMergeStrategy {
    /// Compile a reference element into merge rules.
    #[must_use]
    pub fn new(reference: Element) -> Self {
        let text_template = reference
            .text()
            .filter(|text| has_placeholder(text))
            .map(str::to_string);

        let mut rules: Vec<(String, Rule)> = Vec::new();
        for child in reference.children() {
            if rules.iter().any(|(name, _)| name == child.name()) {
                continue;
            }
            let rule = if !child.children().is_empty() {
                Rule::Nested(Box::new(Self::new(child.clone())))
            } else if let Some(template) = child.text().filter(|text| has_placeholder(text)) {
                Rule::Template(template.to_string())
            } else {
                Rule::Keep
            };
            rules.push((child.name().to_string(), rule));
        }

        Self {
            reference,
            text_template,
            rules,
        }
    }

    /// The reference element this strategy was compiled from.
    pub fn reference(&self) -> &Element {
        &self.reference
    }

    fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules
            .iter()
            .find(|(rule_name, _)| rule_name == name)
            .map(|(_, rule)| rule)
    }

    /// Merge `incoming` into `base`. Without a base the incoming element is
    /// adopted as is.
    ///
    /// # Errors
    /// Returns `UnknownTag` when a template introduces a tag the family
    /// rejects.
    pub fn merge(
        &self,
        ctx: &MergeContext<'_>,
        base: Option<&Element>,
        incoming: &Element,
    ) -> Result<Vec<Element>> {
        match base {
            None => Ok(vec![incoming.clone()]),
            Some(base) => Ok(vec![self.merge_pair(ctx.family(), base, incoming)?]),
        }
    }

    fn merge_pair(
        &self,
        family: &DocumentFamily,
        base: &Element,
        incoming: &Element,
    ) -> Result<Element> {
        let mut merged = Element::new(base.tag().clone());
        for (name, value) in base.attributes().iter().chain(incoming.attributes()) {
            merged.set_attribute(name.clone(), value.clone());
        }
        let text = match &self.text_template {
            Some(template) => Some(fill_template(template, base, incoming)),
            None => incoming.text().or(base.text()).map(str::to_string),
        };
        merged.set_text(text);

        let mut names: Vec<&str> = Vec::new();
        let mentioned = base
            .children()
            .iter()
            .chain(incoming.children())
            .map(Element::name)
            .chain(self.rules.iter().map(|(name, _)| name.as_str()));
        for name in mentioned {
            if !names.contains(&name) {
                names.push(name);
            }
        }

        for name in names {
            let base_children: Vec<&Element> = base.find_children(name).collect();
            let incoming_children: Vec<&Element> = incoming.find_children(name).collect();

            match self.rule(name) {
                Some(Rule::Template(template)) => {
                    let tag = match base_children.first().or(incoming_children.first()) {
                        Some(existing) => existing.tag().clone(),
                        None => family.resolve_child_tag(name, Some(base.name()))?,
                    };
                    let mut child = Element::new(tag);
                    let sources = base_children
                        .first()
                        .into_iter()
                        .chain(incoming_children.first());
                    for existing in sources {
                        for (attr, value) in existing.attributes() {
                            child.set_attribute(attr.clone(), value.clone());
                        }
                    }
                    child.set_text(Some(fill_template(template, base, incoming)));
                    merged.push_child(child);
                }
                Some(Rule::Nested(nested)) => {
                    for child in nested.merge_children(family, &base_children, &incoming_children)?
                    {
                        merged.push_child(child);
                    }
                }
                Some(Rule::Keep) => {
                    let kept = if base_children.is_empty() {
                        &incoming_children
                    } else {
                        &base_children
                    };
                    merged
                        .children_mut()
                        .extend(kept.iter().map(|child| (*child).clone()));
                }
                None => {
                    let kept = if incoming_children.is_empty() {
                        &base_children
                    } else {
                        &incoming_children
                    };
                    merged
                        .children_mut()
                        .extend(kept.iter().map(|child| (*child).clone()));
                }
            }
        }

        if let Some(order) = family.order_of(merged.name()) {
            order_children(merged.children_mut(), order);
        }
        Ok(merged)
    }

    /// Pair same-tag children by key (or by position when the tag has no
    /// key) and merge each pair with this strategy.
    fn merge_children(
        &self,
        family: &DocumentFamily,
        base_children: &[&Element],
        incoming_children: &[&Element],
    ) -> Result<Vec<Element>> {
        let keyed = base_children
            .iter()
            .chain(incoming_children)
            .any(|child| child.tag().key().is_some());

        let mut merged = Vec::with_capacity(base_children.len().max(incoming_children.len()));
        if keyed {
            let mut used = vec![false; incoming_children.len()];
            for base_child in base_children {
                let key = base_child.key_value();
                let partner = incoming_children
                    .iter()
                    .enumerate()
                    .find(|(i, child)| !used[*i] && key.is_some() && child.key_value() == key);
                match partner {
                    Some((i, incoming_child)) => {
                        used[i] = true;
                        merged.push(self.merge_pair(family, base_child, incoming_child)?);
                    }
                    None => merged.push((*base_child).clone()),
                }
            }
            for (i, incoming_child) in incoming_children.iter().enumerate() {
                if !used[i] {
                    merged.push((*incoming_child).clone());
                }
            }
        } else {
            for i in 0..base_children.len().max(incoming_children.len()) {
                match (base_children.get(i), incoming_children.get(i)) {
                    (Some(base_child), Some(incoming_child)) => {
                        merged.push(self.merge_pair(family, base_child, incoming_child)?);
                    }
                    (Some(only), None) | (None, Some(only)) => merged.push((*only).clone()),
                    (None, None) => {}
                }
            }
        }
        Ok(merged)
    }
}

/// Replace `$left:path` and `$right:path` placeholders.
///
/// Values are inserted literally; a `$` inside a value is not expanded.
fn fill_template(template: &str, left: &Element, right: &Element) -> String {
    TEMPLATE_PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            let source = if &caps[1] == "left" { left } else { right };
            source.text_at(&caps[2]).unwrap_or_default().to_string()
        })
        .into_owned()
}
