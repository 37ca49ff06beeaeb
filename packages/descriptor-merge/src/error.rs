//! Error types for the descriptor merge engine.
//!
//! Every merge-time error is fatal for the run that raised it: the engine
//! performs no rollback, so callers discard the partially merged document.

use thiserror::Error;

/// Main error type for the descriptor merge library.
#[derive(Debug, Error)]
pub enum MergeError {
    /// A strategy could not resolve how to merge an element.
    #[error("Merge configuration error for <{tag}>{}: {message}", .discriminator.as_ref().map(|d| format!(" (discriminator '{d}')")).unwrap_or_default())]
    Configuration {
        tag: String,
        discriminator: Option<String>,
        message: String,
    },

    /// A single-valued tag ended up with more than one sibling.
    #[error("Descriptor constraint violated: <{tag}> may appear only once in a {family} document, found {count}")]
    DescriptorConstraintViolation {
        family: String,
        tag: String,
        count: usize,
    },

    /// Tag not declared by a family that rejects unknown tags.
    #[error("Unknown element <{tag_name}> for family {family}{}", .context.as_ref().map(|c| format!(" in {c}")).unwrap_or_default())]
    UnknownTag {
        family: String,
        tag_name: String,
        context: Option<String>,
    },

    /// No family registered under this id.
    #[error("Unknown document family: '{0}'")]
    UnknownFamily(String),

    /// No registered family declares this root element.
    #[error("Cannot determine document family for root element <{root}>")]
    UnknownDocumentType { root: String },

    /// Documents of different families were combined.
    #[error("Document family mismatch: expected {expected}, found {found}")]
    FamilyMismatch { expected: String, found: String },

    /// Overlay root element differs from the base root element.
    #[error("Root element mismatch: expected <{expected}>, found <{found}>")]
    RootMismatch { expected: String, found: String },

    /// Positional insert beyond the end of a child list.
    #[error("Child index {index} out of range for element with {len} children")]
    IndexOutOfRange { index: usize, len: usize },

    /// A whole-document transform failed.
    #[error("Document transform '{program}' failed: {message}")]
    Transform { program: String, message: String },

    /// Container descent exceeded the configured depth.
    #[error("Merge descended deeper than {max} levels at <{tag}>")]
    NestingTooDeep { tag: String, max: usize },

    /// Input document exceeds the size limit.
    #[error("Document too large: {size} bytes (maximum {max})")]
    DocumentTooLarge { size: usize, max: usize },

    /// Nothing to merge.
    #[error("At least one document is required")]
    EmptyMerge,

    /// XML parsing failed.
    #[error("XML parsing failed: {0}")]
    XmlParse(#[from] roxmltree::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Strategy configuration could not be read.
    #[error("Invalid strategy configuration: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl MergeError {
    /// Shorthand for a configuration error without a discriminator.
    pub fn configuration(tag: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            tag: tag.into(),
            discriminator: None,
            message: message.into(),
        }
    }
}

/// Result type alias for merge operations.
pub type Result<T> = std::result::Result<T, MergeError>;
