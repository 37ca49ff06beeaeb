//! Configuration constants and the strategy configuration file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{MergeError, Result};
use crate::grammar::GrammarRegistry;
use crate::merge::{ChooseByName, DescriptorMerger, MergeStrategy, NodeMergeStrategy};
use crate::xml::parse_element;

/// Attribute read by `ChooseByName` unless another one is configured.
pub const DEFAULT_DISCRIMINATOR: &str = "name";

/// Maximum size of a descriptor document in bytes (10 MB).
///
/// Deployment descriptors are small; anything larger is rejected before
/// parsing.
pub const MAX_DOCUMENT_SIZE: usize = 10 * 1024 * 1024;

/// Maximum number of nested containers the merger descends into.
pub const MAX_MERGE_DEPTH: usize = 64;

/// Indentation unit of serialized documents.
pub const INDENT: &str = "  ";

/// Placeholder in node-merge templates: `$left:path` or `$right:path`.
/// Captures: (1) side, (2) slash-separated child path.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
pub static TEMPLATE_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(left|right):([\w./-]+)").expect("valid regex"));

/// Tag name used in errors about the default strategy.
const DEFAULT_STRATEGY_TAG: &str = "*";

/// One strategy as written in a configuration file.
///
/// ```yaml
/// strategy: choose-by-name
/// discriminator: name
/// default: { strategy: overwrite }
/// choices:
///   x: { strategy: preserve }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "strategy", rename_all = "kebab-case")]
pub enum StrategyConfig {
    Preserve,
    Overwrite,
    Ignore,
    ChooseByName {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        discriminator: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<Box<StrategyConfig>>,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        choices: BTreeMap<String, StrategyConfig>,
    },
    NodeMerge {
        /// Inline reference tree.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reference: Option<String>,
        /// Reference tree file, relative to the configuration file.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reference_file: Option<PathBuf>,
    },
    /// Accepted so it can be reported clearly: transforms are code, not
    /// configuration.
    Xslt {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        program: Option<String>,
    },
}

impl StrategyConfig {
    /// Build the strategy for `tag` (`None` for the default strategy).
    ///
    /// # Errors
    /// Returns `Configuration` for an `xslt` strategy, for a node-merge
    /// without exactly one reference, or for a reference whose root does
    /// not match the tag. Reference parsing errors are passed through.
    pub fn build(
        &self,
        tag: Option<&str>,
        grammar: &GrammarRegistry,
        family: &str,
        base_dir: Option<&Path>,
    ) -> Result<MergeStrategy> {
        let tag_name = tag.unwrap_or(DEFAULT_STRATEGY_TAG);
        match self {
            Self::Preserve => Ok(MergeStrategy::Preserve),
            Self::Overwrite => Ok(MergeStrategy::Overwrite),
            Self::Ignore => Ok(MergeStrategy::Ignore),
            Self::ChooseByName {
                discriminator,
                default,
                choices,
            } => {
                let mut choose = ChooseByName::new();
                if let Some(discriminator) = discriminator {
                    choose = choose.with_discriminator(discriminator.clone());
                }
                if let Some(default) = default {
                    choose = choose.with_default(default.build(tag, grammar, family, base_dir)?);
                }
                for (value, choice) in choices {
                    choose = choose
                        .with_choice(value.clone(), choice.build(tag, grammar, family, base_dir)?);
                }
                Ok(choose.into())
            }
            Self::NodeMerge {
                reference,
                reference_file,
            } => {
                let text = match (reference, reference_file) {
                    (Some(reference), None) => reference.clone(),
                    (None, Some(file)) => {
                        let path = match base_dir {
                            Some(dir) => dir.join(file),
                            None => file.clone(),
                        };
                        fs::read_to_string(&path)?
                    }
                    _ => {
                        return Err(MergeError::configuration(
                            tag_name,
                            "node-merge needs exactly one of 'reference' and 'reference_file'",
                        ))
                    }
                };
                let reference = parse_element(&text, grammar, family)?;
                if let Some(tag) = tag {
                    if reference.name() != tag {
                        return Err(MergeError::configuration(
                            tag,
                            format!("reference root is <{}>", reference.name()),
                        ));
                    }
                }
                Ok(NodeMergeStrategy::new(reference).into())
            }
            Self::Xslt { .. } => Err(MergeError::configuration(
                tag_name,
                "xslt transforms must be registered programmatically",
            )),
        }
    }
}

/// Strategy configuration file.
///
/// ```yaml
/// family: web-app
/// descend_containers: false
/// default:
///   strategy: overwrite
/// tags:
///   context-param:
///     strategy: preserve
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct MergeConfig {
    /// Family the configuration is written for; taken from the base
    /// document when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    /// Merge containers without a strategy structurally.
    #[serde(default)]
    pub descend_containers: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<StrategyConfig>,
    #[serde(default)]
    pub tags: BTreeMap<String, StrategyConfig>,
}

impl MergeConfig {
    /// Parse a configuration from YAML text.
    ///
    /// # Errors
    /// Returns `Yaml` for malformed input or unknown strategy names.
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(text)?)
    }

    /// Read a configuration file.
    ///
    /// # Errors
    /// Returns `Io` or `Yaml`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config = Self::from_yaml(&text)?;
        tracing::debug!(
            path = %path.display(),
            tags = config.tags.len(),
            "Loaded merge configuration"
        );
        Ok(config)
    }

    /// Build a merger for documents of `family`.
    ///
    /// Reference files are resolved against `base_dir`, normally the
    /// directory of the configuration file.
    ///
    /// # Errors
    /// Returns `FamilyMismatch` when the configuration names another
    /// family, `UnknownFamily`, or any error building a strategy.
    pub fn build_merger<'g>(
        &self,
        grammar: &'g GrammarRegistry,
        family: &str,
        base_dir: Option<&Path>,
    ) -> Result<DescriptorMerger<'g>> {
        if let Some(configured) = &self.family {
            if configured != family {
                return Err(MergeError::FamilyMismatch {
                    expected: configured.clone(),
                    found: family.to_string(),
                });
            }
        }
        grammar.family(family)?;

        let mut merger = DescriptorMerger::new(grammar);
        merger.set_container_descent(self.descend_containers);
        if let Some(default) = &self.default {
            merger.set_default(default.build(None, grammar, family, base_dir)?);
        }
        for (tag, strategy) in &self.tags {
            merger.set_strategy(
                tag.clone(),
                strategy.build(Some(tag), grammar, family, base_dir)?,
            );
        }
        Ok(merger)
    }
}
