//! Conflict-resolution strategies.

use std::collections::BTreeMap;

use super::node_merge::NodeMergeStrategy;
use super::transform::XsltStrategy;
use crate::config::DEFAULT_DISCRIMINATOR;
use crate::element::Element;
use crate::error::{MergeError, Result};
use crate::grammar::DocumentFamily;

/// Read-only view of the grammar for the document being merged.
#[derive(Debug, Clone, Copy)]
pub struct MergeContext<'a> {
    family: &'a DocumentFamily,
}

impl<'a> MergeContext<'a> {
    #[must_use]
    pub fn new(family: &'a DocumentFamily) -> Self {
        Self { family }
    }

    pub fn family(&self) -> &'a DocumentFamily {
        self.family
    }
}

/// Policy deciding what survives when an incoming element meets the base.
///
/// Every strategy returns the list of elements that takes the place of the
/// base element (or is added, when there is no base). With no base the
/// incoming element is adopted, except for [`MergeStrategy::Ignore`] and a
/// [`ChooseByName`] that has nothing to delegate to.
#[derive(Debug, Clone)]
pub enum MergeStrategy {
    /// Keep the base element.
    Preserve,
    /// Replace the base element with the incoming one.
    Overwrite,
    /// Keep the base element and drop first-time introductions.
    Ignore,
    /// Delegate on the value of a discriminator attribute.
    ChooseByName(ChooseByName),
    /// Combine base and incoming along a reference tree.
    NodeMerge(NodeMergeStrategy),
    /// Whole-document transform, only valid for the root tag.
    Xslt(XsltStrategy),
}

impl MergeStrategy {
    /// Short name used in logs and configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Preserve => "preserve",
            Self::Overwrite => "overwrite",
            Self::Ignore => "ignore",
            Self::ChooseByName(_) => "choose-by-name",
            Self::NodeMerge(_) => "node-merge",
            Self::Xslt(_) => "xslt",
        }
    }

    /// Merge `incoming` against an optional `base` element of the same tag.
    ///
    /// # Errors
    /// Returns `Configuration` when a `ChooseByName` cannot pick a strategy
    /// or when a whole-document transform is applied to a single element.
    pub fn merge(
        &self,
        ctx: &MergeContext<'_>,
        base: Option<&Element>,
        incoming: &Element,
    ) -> Result<Vec<Element>> {
        match self {
            Self::Preserve => Ok(vec![base.unwrap_or(incoming).clone()]),
            Self::Overwrite => Ok(vec![incoming.clone()]),
            Self::Ignore => Ok(base.cloned().into_iter().collect()),
            Self::ChooseByName(choose) => choose.select(incoming)?.merge(ctx, base, incoming),
            Self::NodeMerge(node_merge) => node_merge.merge(ctx, base, incoming),
            Self::Xslt(xslt) => Err(MergeError::configuration(
                incoming.name(),
                format!(
                    "transform '{}' works on whole documents and cannot be registered for a nested tag",
                    xslt.program()
                ),
            )),
        }
    }
}

impl From<ChooseByName> for MergeStrategy {
    fn from(choose: ChooseByName) -> Self {
        Self::ChooseByName(choose)
    }
}

impl From<NodeMergeStrategy> for MergeStrategy {
    fn from(node_merge: NodeMergeStrategy) -> Self {
        Self::NodeMerge(node_merge)
    }
}

impl From<XsltStrategy> for MergeStrategy {
    fn from(xslt: XsltStrategy) -> Self {
        Self::Xslt(xslt)
    }
}

/// Strategy that picks a delegate by the value of a discriminator.
///
/// The discriminator is an attribute of the incoming element (`name` unless
/// configured otherwise). Elements without that attribute fall back to the
/// value of their tag key, so `context-param` elements can be told apart by
/// their `param-name`.
#[derive(Debug, Clone)]
pub struct ChooseByName {
    discriminator: String,
    default: Option<Box<MergeStrategy>>,
    choices: BTreeMap<String, MergeStrategy>,
}

impl Default for ChooseByName {
    fn default() -> Self {
        Self::new()
    }
}

impl ChooseByName {
    /// Create a chooser on the default discriminator, with no default and
    /// no choices.
    #[must_use]
    pub fn new() -> Self {
        Self {
            discriminator: DEFAULT_DISCRIMINATOR.to_string(),
            default: None,
            choices: BTreeMap::new(),
        }
    }

    /// Use another attribute as discriminator.
    #[must_use]
    pub fn with_discriminator(mut self, attribute: impl Into<String>) -> Self {
        self.discriminator = attribute.into();
        self
    }

    /// Strategy used when no choice matches.
    #[must_use]
    pub fn with_default(mut self, strategy: MergeStrategy) -> Self {
        self.default = Some(Box::new(strategy));
        self
    }

    /// Strategy used for elements whose discriminator equals `value`.
    #[must_use]
    pub fn with_choice(mut self, value: impl Into<String>, strategy: MergeStrategy) -> Self {
        self.choices.insert(value.into(), strategy);
        self
    }

    pub fn discriminator(&self) -> &str {
        &self.discriminator
    }

    pub fn default_strategy(&self) -> Option<&MergeStrategy> {
        self.default.as_deref()
    }

    pub fn choices(&self) -> &BTreeMap<String, MergeStrategy> {
        &self.choices
    }

    /// Discriminator value of an element: the attribute, else its key value.
    pub fn discriminator_value(&self, element: &Element) -> Option<String> {
        element
            .attribute(&self.discriminator)
            .map(str::to_string)
            .or_else(|| element.key_value())
    }

    /// Pick the strategy for an incoming element.
    ///
    /// # Errors
    /// Returns `Configuration` when nothing matches and there is no default.
    pub fn select(&self, incoming: &Element) -> Result<&MergeStrategy> {
        let value = self.discriminator_value(incoming);
        if let Some(strategy) = value.as_deref().and_then(|v| self.choices.get(v)) {
            return Ok(strategy);
        }
        self.default
            .as_deref()
            .ok_or_else(|| MergeError::Configuration {
                tag: incoming.name().to_string(),
                discriminator: value,
                message: "no choice matches and no default strategy is set".to_string(),
            })
    }
}
