//! Descriptor Merge - Combine Java EE deployment descriptors.
//!
//! This crate merges structured deployment descriptors (`web.xml`,
//! `application.xml`, ...) into one document. Every element kind has its own
//! conflict-resolution strategy, and the merged result keeps the sibling
//! order the descriptor grammar prescribes.
//!
//! # Example
//!
//! ```
//! use descriptor_merge::grammar::create_default_grammar;
//! use descriptor_merge::merge::{DescriptorMerger, MergeStrategy};
//! use descriptor_merge::xml::parse_document;
//!
//! let grammar = create_default_grammar();
//! let base = parse_document(
//!     "<web-app><servlet><servlet-name>main</servlet-name></servlet></web-app>",
//!     &grammar,
//!     None,
//! )?;
//! let overlay = parse_document(
//!     "<web-app><display-name>Shop</display-name></web-app>",
//!     &grammar,
//!     None,
//! )?;
//!
//! let merger = DescriptorMerger::new(&grammar).with_strategy("servlet", MergeStrategy::Preserve);
//! let merged = merger.merge_into(base, &[overlay])?;
//!
//! // display-name is placed before servlet, as the grammar requires
//! let root = merged.root_element();
//! let names: Vec<_> = root.children().iter().map(|c| c.name()).collect();
//! assert_eq!(names, vec!["display-name", "servlet"]);
//! # Ok::<(), descriptor_merge::MergeError>(())
//! ```
//!
//! # Architecture
//!
//! - [`element`]: Document tree and detached element subtrees
//! - [`grammar`]: Tags, document families and their sibling order
//! - [`merge`]: Merge strategies, the tag-dispatched merger and concatenation
//! - [`xml`]: Parsing and serialization
//! - [`config`]: Constants and the YAML strategy configuration
//! - [`error`]: Error types and Result alias
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod element;
pub mod error;
pub mod grammar;
pub mod merge;
pub mod xml;

// Re-export commonly used items
pub use config::MergeConfig;
pub use element::{Document, Element, NodeId};
pub use error::{MergeError, Result};
pub use grammar::{DocumentFamily, GrammarRegistry, Tag, TagKey};
pub use merge::{merge_documents, DescriptorMerger, MergeStrategy};
