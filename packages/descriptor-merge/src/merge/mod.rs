//! Descriptor merging.
//!
//! [`DescriptorMerger`] merges a base document with overlays by dispatching
//! every element to the [`MergeStrategy`] registered for its tag.
//! [`merge_documents`] concatenates documents without any conflict
//! resolution.

mod concat;
mod engine;
mod inserter;
mod node_merge;
mod strategy;
mod transform;

pub use concat::merge_documents;
pub use engine::DescriptorMerger;
pub use inserter::{insert_ordered, order_children};
pub use node_merge::NodeMergeStrategy;
pub use strategy::{ChooseByName, MergeContext, MergeStrategy};
pub use transform::{DocumentTransform, XsltStrategy};
